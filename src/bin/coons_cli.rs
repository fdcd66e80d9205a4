#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("coons_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use coons_engine::export::{obj_string, write_obj_file};
    use coons_engine::parse::points::read_points_file;
    use coons_engine::pipeline::{PatchBatch, PatchOptions, build_patches};
    use std::path::PathBuf;

    const USAGE: &str = r#"coons_cli (coons-engine)

Builds bilinear Coons patches from a point file (16 points per patch:
four boundary curves of four control points each) and writes them as OBJ.

USAGE:
  coons_cli <points.txt> [options]

OPTIONS:
  --out <path>         Write OBJ to this file (default: stdout)
  --samples <n>        Samples per boundary curve / grid side (default 100)
  --quads              Emit quad faces instead of triangles
  --tolerance <eps>    Maximum corner gap between curve endpoints (default 1e-6)
  --name <name>        Object name in the OBJ output (default patch_<i>)
  --sequential         Do not use the rayon pool, even if compiled in
  --overwrite          Overwrite an existing output file
  -h, --help           Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let mut input: Option<PathBuf> = None;
        let mut out_path: Option<PathBuf> = None;
        let mut name = String::new();
        let mut overwrite = false;
        let mut options = PatchOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => out_path = Some(PathBuf::from(args.value("--out")?)),
                "--samples" => options.samples_per_curve = parse_flag(&mut args, "--samples")?,
                "--tolerance" => options.corner_tolerance = parse_flag(&mut args, "--tolerance")?,
                "--quads" => options.triangulate = false,
                "--name" => name = args.value("--name")?,
                "--sequential" => options.parallel = false,
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                other => {
                    if input.is_some() {
                        return Err(format!("unexpected argument `{other}`\n\n{USAGE}"));
                    }
                    input = Some(PathBuf::from(other));
                }
            }
        }

        let Some(input) = input else {
            print_usage();
            return Err("missing point file".to_string());
        };

        let points = read_points_file(&input).map_err(|e| format!("{}: {e}", input.display()))?;
        let batch = build_patches(&points, &options).map_err(|e| e.to_string())?;

        let count = batch.patches.len();
        let names: Vec<String> = (0..count)
            .map(|index| PatchBatch::patch_name(&name, index, count))
            .collect();
        let meshes = names
            .iter()
            .map(String::as_str)
            .zip(batch.patches.iter().map(|patch| &patch.mesh));

        if let Some(path) = out_path.as_deref() {
            write_obj_file(path, meshes, overwrite).map_err(|e| e.to_string())?;
            eprintln!("wrote {}", path.display());
        } else {
            let text = obj_string(meshes).map_err(|e| e.to_string())?;
            print!("{text}");
        }

        for (patch_name, patch) in names.iter().zip(&batch.patches) {
            eprintln!(
                "{patch_name}: vertices={} faces={} | {}",
                patch.mesh.vertex_count(),
                patch.mesh.face_count(),
                patch.diagnostics.summary()
            );
            for warning in &patch.diagnostics.warnings {
                eprintln!("  warning: {warning}");
            }
        }

        Ok(())
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn parse_flag<T: std::str::FromStr>(args: &mut Args, flag: &str) -> Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        let raw = args.value(flag)?;
        raw.parse()
            .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
