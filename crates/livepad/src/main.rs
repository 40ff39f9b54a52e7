use clap::Parser;
use cli::{Args, RunCmd};

const BUILD_TIME: &str = include!(concat!(env!("OUT_DIR"), "/compiled_at.txt"));

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Display the current version.
    #[clap(name = "version")]
    Version,

    /// Run the livepad.
    #[clap(flatten)]
    Run(Box<RunCmd>),
}

#[derive(Parser, Debug)]
#[clap(name = "livepad", disable_version_flag = true)]
pub struct Livepad {
    #[clap(flatten)]
    pub args: Args,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let livepad = Livepad::parse();

    match livepad.cmd {
        Cmd::Version => {
            println!(
                "version {}{}, compiled at: {}, built for {} by {}.",
                built_info::PKG_VERSION,
                built_info::GIT_VERSION.map_or_else(|| "".to_owned(), |v| format!(" (git {v})")),
                BUILD_TIME,
                built_info::TARGET,
                built_info::RUSTC_VERSION
            );
        }
        Cmd::Run(run_cmd) => {
            if let Err(e) = run_cmd.run(livepad.args).await {
                eprintln!("error: {e:?}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let livepad = Livepad::try_parse_from([
            "livepad",
            "--config-file",
            "/tmp/livepad.toml",
            "serve",
            "--port",
            "8080",
            "--no-browser",
        ])
        .unwrap();

        assert_eq!(
            livepad.args.config_file,
            Some(std::path::PathBuf::from("/tmp/livepad.toml"))
        );
        match livepad.cmd {
            Cmd::Run(run_cmd) => match *run_cmd {
                RunCmd::Serve(serve) => {
                    assert_eq!(serve.port, Some(8080));
                    assert!(serve.no_browser);
                    assert!(serve.watch.is_none());
                }
                cmd => panic!("unexpected command {cmd:?}"),
            },
            cmd => panic!("unexpected command {cmd:?}"),
        }
    }

    #[test]
    fn test_parse_version() {
        let livepad = Livepad::try_parse_from(["livepad", "version"]).unwrap();
        assert!(matches!(livepad.cmd, Cmd::Version));
    }
}
