//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! and serves `static/` on a local port for manual checks of the effects.

#[cfg(not(target_arch = "wasm32"))]
mod dev {
    use std::path::PathBuf;
    use std::process::{Command, ExitCode, Stdio};

    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(name = "portfolio_fx", about = "Build the canvas effects and serve the demo page")]
    pub struct Args {
        /// Port for the local HTTP server.
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Serve whatever is already in static/pkg.
        #[arg(long)]
        no_build: bool,

        /// Build without optimisations.
        #[arg(long)]
        dev: bool,

        /// Directory to serve.
        #[arg(long, default_value = "static")]
        root: PathBuf,
    }

    fn wasm_pack(args: &Args) -> Result<(), String> {
        let profile = if args.dev { "--dev" } else { "--release" };
        let out_dir = args.root.join("pkg");
        log::info!("building wasm bundle into {}", out_dir.display());
        let status = Command::new("wasm-pack")
            .args(["build", profile, "--target", "web", "--out-dir"])
            .arg(&out_dir)
            .status()
            .map_err(|e| format!("wasm-pack not runnable ({e}); install it from https://rustwasm.github.io/wasm-pack/"))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("wasm-pack exited with {status}"))
        }
    }

    fn serve(args: &Args) -> Result<(), String> {
        if !args.root.is_dir() {
            return Err(format!("{} is not a directory", args.root.display()));
        }
        log::info!("serving {} at http://127.0.0.1:{}", args.root.display(), args.port);
        let status = Command::new("python3")
            .args(["-m", "http.server"])
            .arg(args.port.to_string())
            .arg("--directory")
            .arg(&args.root)
            .stdout(Stdio::null())
            .status()
            .map_err(|e| format!("failed to start http server: {e}"))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("http server exited with {status}"))
        }
    }

    pub fn run() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();
        log::debug!("{args:?}");

        if args.no_build {
            log::info!("skipping wasm build");
        } else if let Err(e) = wasm_pack(&args) {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }

        match serve(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    dev::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
