use std::sync::Arc;

use clap::Parser as _;
use color_eyre::{Result, eyre::WrapErr as _};
use engine::{config::load_credential, vision::OpenAiVision};
use vision_ai::{APP_NAME, Gui, cli::Cli, config_path, style};

pub fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = config_path(cli.config)?;
    let api_key = load_credential(&config, &cli.profile)
        .wrap_err_with(|| format!("While loading {}", config.display()))?;
    let theme = style::load_style(cli.style)?
        .map(|s| s.theme())
        .transpose()?;

    let model = Arc::new(OpenAiVision::new(api_key));
    iced::application(
        move || Gui::new(model.clone(), theme.clone()),
        Gui::update,
        Gui::view,
    )
    .title(APP_NAME)
    .theme(Gui::theme)
    .subscription(Gui::subscription)
    .run()?;
    Ok(())
}
