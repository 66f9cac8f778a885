use clap::Parser;
use miette::Result;
use plm::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`plm part list | head`)
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
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    plm::cli::logging::init(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Part(cmd) => commands::part::run(cmd, &global),
        Commands::Search(args) => commands::search::run(args, &global),
        Commands::Suggest(args) => commands::suggest::run(args, &global),
        Commands::Mfr(cmd) => commands::mfr::run(cmd, &global),
        Commands::Category(cmd) => commands::category::run(cmd, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
