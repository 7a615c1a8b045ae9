use std::{fs, path::PathBuf};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use iced::{Color, Theme, theme::Palette};
use serde::Deserialize;

/// Presentation overrides loaded from a local RON file, the counterpart of
/// the usual custom stylesheet. Purely cosmetic: unset colors keep the
/// default theme's value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Style {
    pub background: Option<String>,
    pub text: Option<String>,
    pub primary: Option<String>,
    pub success: Option<String>,
    pub danger: Option<String>,
}

impl Style {
    pub fn theme(&self) -> Result<Theme> {
        let base = Theme::SolarizedLight.palette();
        let palette = Palette {
            background: resolve(&self.background, base.background)?,
            text: resolve(&self.text, base.text)?,
            primary: resolve(&self.primary, base.primary)?,
            success: resolve(&self.success, base.success)?,
            danger: resolve(&self.danger, base.danger)?,
            ..base
        };
        Ok(Theme::custom("style.ron", palette))
    }
}

fn resolve(hex: &Option<String>, default: Color) -> Result<Color> {
    match hex {
        Some(s) => s
            .parse::<Color>()
            .ok()
            .ok_or_else(|| eyre!("Invalid color literal: {s}")),
        None => Ok(default),
    }
}

/// Loads the style file if there is one. Without a `--style` flag only a
/// `style.ron` in the working directory is picked up, and its absence is
/// fine; an explicitly named file has to exist and parse.
pub fn load_style(cli_override: Option<PathBuf>) -> Result<Option<Style>> {
    let path = match cli_override {
        Some(path) => path,
        None => {
            let local = PathBuf::from("style.ron");
            if !local.exists() {
                return Ok(None);
            }
            local
        }
    };
    let src = fs::read_to_string(&path)
        .wrap_err_with(|| format!("Couldn't read style file {}", path.display()))?;
    let style = ron::from_str(&src)
        .wrap_err_with(|| format!("Invalid style file {}", path.display()))?;
    Ok(Some(style))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overrides_are_applied_on_top_of_the_default_palette() {
        let style: Style = ron::from_str(
            r##"Style(
                background: Some("#fdf6e3"),
                danger: Some("#dc322f"),
            )"##,
        )
        .unwrap();

        let theme = style.theme().unwrap();
        let palette = theme.palette();
        assert_eq!(palette.background, "#fdf6e3".parse::<Color>().unwrap());
        assert_eq!(palette.danger, "#dc322f".parse::<Color>().unwrap());
        assert_eq!(palette.text, Theme::SolarizedLight.palette().text);
    }

    #[test]
    fn invalid_color_literals_are_rejected() {
        let style = Style {
            background: Some("not-a-color".into()),
            ..Style::default()
        };
        assert!(style.theme().is_err());
    }
}
