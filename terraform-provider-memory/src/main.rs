use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod grpc;
mod marshal;
mod provider;
mod serve;

fn main() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    match &args.command {
        None => {
            // Launched by the orchestrator: handshake on stdout, then serve.
            init_logging()?;
            serve::serve(provider::MemoryProvider::new()).await
        }
        Some(Commands::GenerateMan) => {
            let cmd = Args::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            println!("{}", String::from_utf8(buffer)?);
            Ok(())
        }
        Some(Commands::GenerateMarkdown) => {
            let opts = clap_markdown::MarkdownOptions::new().show_footer(false);
            let markdown: String = clap_markdown::help_markdown_custom::<Args>(&opts);
            println!("{}", markdown);
            Ok(())
        }
        Some(Commands::GenerateCompletion { shell }) => {
            let mut cmd = Args::command();
            clap_complete::generate(
                *shell,
                &mut cmd,
                "terraform-provider-memory",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::{
        filter::LevelFilter, fmt::Layer as FmtLayer, layer::SubscriberExt as _, Layer as _,
        Registry,
    };

    // stdout carries the plugin handshake; all logging goes to stderr.
    let level = if std::env::var_os("TF_LOG").is_some() {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let fmt_layer = FmtLayer::new()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_filter(level);
    let subscriber = Registry::default().with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set up tracing: {}", e))?;

    Ok(())
}

/// Terraform provider for a single in-state "memory" resource
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate markdown documentation
    #[command(hide = true)]
    GenerateMarkdown,

    /// Generate a manpage
    #[command(hide = true)]
    GenerateMan,

    /// Generate shell completion
    #[command(hide = true)]
    GenerateCompletion {
        /// The shell to generate completion for
        #[arg(long)]
        shell: clap_complete::Shell,
    },
}
