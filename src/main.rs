use owo_colors::OwoColorize;
use subprobe::prelude::*;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // build a formatting subscriber with a max level of WARN unless verbose
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Some(shell) = args.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "subprobe", &mut std::io::stdout());
        return Ok(());
    }

    if args.create_sample {
        let count = create_sample(&args.file).await?;
        println!(
            "{} Created sample subdomain list with {count} entries at {}",
            "[INFO]".blue(),
            args.file.display()
        );
        return Ok(());
    }

    run(&args).await?;

    Ok(())
}
