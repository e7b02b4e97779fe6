mod cli;
mod platform;

use anyhow::anyhow;
use clap::Parser;
use slides_logging::{slides_error, slides_info};

use cli::{Cli, Command};
use platform::{check_links, load_settings, save_settings, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    slides_logging::initialize(cli.log_to.into(), cli.log_level.into(), &cli.log_file);

    let mut settings = load_settings(&cli.settings);
    cli.apply_overrides(&mut settings);
    slides_info!(
        "Backend {} deck {}",
        settings.backend.base_url,
        settings.deck_dir.display()
    );

    let result = match &cli.command {
        Command::InitSettings { force } => {
            if cli.settings.exists() && !force {
                Err(anyhow!(
                    "{} already exists; pass --force to overwrite",
                    cli.settings.display()
                ))
            } else {
                save_settings(&cli.settings, &settings)
                    .map(|path| println!("Wrote {}", path.display()))
                    .map_err(anyhow::Error::from)
            }
        }
        Command::CheckLinks { links } => {
            if check_links(links) {
                Ok(())
            } else {
                Err(anyhow!("one or more links do not match their field"))
            }
        }
        Command::Generate { activity, grade } => Session::start(&settings).and_then(|mut session| {
            session.identify(activity)?;
            session.select_grade(grade)?;
            session.generate()
        }),
        Command::SyncLinks {
            activity,
            links,
            yes,
        } => Session::start(&settings).and_then(|mut session| {
            session.identify(activity)?;
            session.edit_links(links);
            session.sync_links(*yes)
        }),
        Command::CreateVariation {
            activity,
            grade,
            links,
        } => Session::start(&settings).and_then(|mut session| {
            session.identify(activity)?;
            session.select_grade(grade)?;
            session.edit_links(links);
            session.create_variation()
        }),
    };

    if let Err(err) = &result {
        slides_error!("{:#}", err);
    }
    result
}
