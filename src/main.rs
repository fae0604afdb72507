use clap::Parser;
use miette::Result;
use relcache::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => relcache::cli::commands::init::run(args),
        Commands::New(args) => relcache::cli::commands::new::run(args, &global),
        Commands::Link(cmd) => relcache::cli::commands::link::run(cmd, &global),
        Commands::Count(args) => relcache::cli::commands::count::run(args, &global),
        Commands::Show(args) => relcache::cli::commands::show::run(args, &global),
        Commands::Search(args) => relcache::cli::commands::search::run(args, &global),
        Commands::Index(cmd) => relcache::cli::commands::index::run(cmd, &global),
    }
}

/// Log to stderr; `RELCACHE_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "relcache=debug" } else { "relcache=warn" };
    let filter = EnvFilter::try_from_env("RELCACHE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
