mod test_curve_basic;
