use initialterm::core::config::Config;
use initialterm::flags::Flags;
use initialterm::platform::Platform;
use initialterm::shell::Shell;
use std::env;

fn main() -> Result<(), initialterm::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("initialterm {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let _log_guard = initialterm::logging::init(&flags);

    let platform = match Platform::detect() {
        Ok(platform) => platform,
        Err(e) => {
            tracing::error!(error = %e, "unsupported platform");
            eprintln!("{}", e);
            return Ok(());
        }
    };

    let mut config = Config::new()?;
    config.load(&flags)?;
    tracing::debug!(?config, %platform, "configuration loaded");

    if flags.is_set("spawn") {
        tracing::info!("spawn requested, not starting the interactive prompt");
        return Ok(());
    }

    let mut shell = Shell::new(flags, config, platform)?;
    shell.run()
}
