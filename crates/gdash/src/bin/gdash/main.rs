mod cli;

use gdash::documents::HclDocuments;
use gdash::output::Format;
use gdash::workspace::{Address, Provider, Workspace};
use std::io::Write;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("GDASH_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::List(list_cli) => list(list_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let address: Address = cli.address.parse()?;

    let workspace = Workspace::new(load(&cli.input)?)?;
    let provider = Provider::configure(&workspace)?;

    let format = if cli.output.compact {
        Format::Compact
    } else {
        Format::Pretty
    };
    let rendered = provider.render(&address, format)?;

    output(&cli.output, &rendered)
}

pub fn list(cli: cli::ListCommand) -> anyhow::Result<()> {
    let workspace = Workspace::new(load(&cli.input)?)?;

    let mut stdout = std::io::stdout().lock();
    for address in workspace.addresses() {
        writeln!(stdout, "{address}")?;
    }

    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<HclDocuments> {
    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        let body = hcl::parse(&stdin)?;
        return Ok(body.into());
    }

    let mut documents = HclDocuments::default();

    if input.workdir {
        documents.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        documents.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        documents.load_directory(dir_path)?;
    }

    anyhow::ensure!(documents.file_count() > 0, "No files loaded");

    Ok(documents)
}

fn output(output: &cli::OutputArgs, rendered: &gdash::output::Rendered) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();

    if output.id {
        writeln!(stdout, "{}", rendered.id)?;
        return Ok(());
    }

    match output.format {
        cli::OutputFormat::Json => writeln!(stdout, "{}", rendered.json)?,
        cli::OutputFormat::Yaml => {
            let value: serde_json::Value = serde_json::from_str(&rendered.json)?;
            serde_yaml::to_writer(&mut stdout, &value)?
        }
    };

    Ok(())
}

/// (gdash-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;

    match cli.command {
        cli::DevSubCommand::Documents => println!("{documents:#?}"),
        cli::DevSubCommand::Workspace => {
            let workspace = Workspace::new(documents)?;
            let provider = Provider::configure(&workspace)?;
            println!("{workspace:#?}");
            println!("{:#?}", provider.defaults());
        }
    }

    Ok(())
}
