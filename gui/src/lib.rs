use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use base64::Engine as _;
use color_eyre::{
    Result,
    eyre::{WrapErr as _, ensure, eyre},
};
use engine::vision::{self, OpenAiVision};
use iced::{
    Element, Event, Font, Length, Subscription, Task, Theme, event,
    font::{self},
    padding,
    widget::{self, button, container, image::Handle, row, scrollable, text, text_input},
    window,
};
use log::debug;

use crate::message::Message;

pub mod cli;
pub mod message;
pub mod style;

pub const APP_NAME: &str = "Vision AI";

const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub struct Gui {
    model: Arc<OpenAiVision>,
    theme: Theme,
    phase: Phase,
    path_input: String,
    preview: Option<(Handle, String)>,
}

/// Where the current interaction stands. `Answered` holds whatever the
/// describe call returned, which may already be an "Error: ..." string;
/// `Failed` is for everything that went wrong before a request was sent.
#[derive(Debug)]
enum Phase {
    Idle,
    Processing,
    Answered(String),
    Failed(String),
}

impl Gui {
    pub fn new(model: Arc<OpenAiVision>, theme: Option<Theme>) -> Self {
        Gui {
            model,
            theme: theme.unwrap_or(Theme::SolarizedLight),
            phase: Phase::Idle,
            path_input: String::new(),
            preview: None,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match self.try_update(message) {
            Ok(task) => task,
            Err(e) => {
                self.phase = Phase::Failed(format!("{e:?}"));
                Task::none()
            }
        }
    }

    fn try_update(&mut self, message: Message) -> Result<Task<Message>> {
        match message {
            Message::PathInputChanged(input) => {
                self.path_input = input;
                Ok(Task::none())
            }
            Message::Submit => {
                ensure!(!self.path_input.trim().is_empty(), "No image selected");
                self.start_describe(PathBuf::from(self.path_input.trim()))
            }
            Message::FileDropped(path) => self.start_describe(path),
            Message::DescriptionReady(text) => {
                self.phase = Phase::Answered(text);
                Ok(Task::none())
            }
        }
    }

    /// The upload half of the pipeline: validate the extension, read and
    /// preview the file, base64-encode it and fire the describe request.
    fn start_describe(&mut self, path: PathBuf) -> Result<Task<Message>> {
        if matches!(self.phase, Phase::Processing) {
            debug!(
                "ignoring upload of {}, a request is in flight",
                path.display()
            );
            return Ok(Task::none());
        }

        let mime_type = image_mime_type(&path)?;
        let bytes = fs::read(&path)
            .wrap_err_with(|| format!("Couldn't read image file {}", path.display()))?;
        let caption = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.preview = Some((Handle::from_bytes(bytes.clone()), caption));

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        self.phase = Phase::Processing;
        let model = self.model.clone();
        Ok(Task::perform(
            async move { vision::describe_image(model.as_ref(), image_base64, mime_type).await },
            Message::DescriptionReady,
        ))
    }

    pub fn view(&self) -> Element<'_, Message> {
        let processing = matches!(self.phase, Phase::Processing);

        let mut col: Vec<Element<Message>> = vec![
            text(APP_NAME).size(32).into(),
            widget::rule::horizontal(2).into(),
            text("Upload an image and the AI will describe what it sees.").into(),
            row![
                text_input("path/to/image.png", &self.path_input)
                    .on_input(Message::PathInputChanged)
                    .on_submit(Message::Submit),
                button("Describe").on_press_maybe((!processing).then_some(Message::Submit)),
            ]
            .spacing(10)
            .into(),
            italic_text("... or drop a jpg, jpeg or png file into this window").into(),
        ];

        if let Some((handle, caption)) = &self.preview {
            col.push(container(widget::image(handle)).max_width(600).into());
            col.push(italic_text(caption).into());
        }

        match &self.phase {
            Phase::Idle => {}
            Phase::Processing => col.push(text("Processing image...").into()),
            Phase::Answered(description) => {
                col.push(bold_text("Generated Description").size(24).into());
                col.push(text(description).into());
            }
            Phase::Failed(msg) => col.push(text(msg).style(text::danger).into()),
        }

        top_level_container(widget::column(col).spacing(15)).into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }
}

/// Derives the `image/<subtype>` MIME type from the file extension. Only the
/// three upload formats are accepted.
pub fn image_mime_type(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| eyre!("{} has no file extension", path.display()))?;
    ensure!(
        SUPPORTED_EXTENSIONS.contains(&ext.as_str()),
        "Unsupported file type .{ext}, expected one of: jpg, jpeg, png"
    );
    Ok(mime_guess::from_ext(&ext)
        .first_raw()
        .unwrap_or("image/jpeg")
        .to_string())
}

/// Explicit path if given, then ./config.toml, then the per-user location.
pub fn config_path(cli_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        return Ok(path);
    }
    let local = PathBuf::from("config.toml");
    if local.exists() {
        return Ok(local);
    }
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join("vision_ai.toml"))
}

fn italic_text(t: &str) -> widget::Text<'_> {
    text(t).font(italic_default_font())
}

fn italic_default_font() -> Font {
    Font {
        style: font::Style::Italic,
        ..Font::DEFAULT
    }
}

fn bold_text<'a>(t: impl text::IntoFragment<'a>) -> widget::Text<'a> {
    text(t).font(bold_default_font())
}

fn bold_default_font() -> Font {
    Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    }
}

fn top_level_container<'a, T: Send + 'static>(
    elem: impl Into<Element<'a, T>>,
) -> container::Container<'a, T> {
    container(
        container(scrollable(
            container(elem).padding(padding::all(10).right(20)),
        ))
        .padding(20)
        .max_width(800),
    )
    .center(Length::Fill)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mime_types_for_the_supported_extensions() {
        assert_eq!(image_mime_type(Path::new("cat.jpg")).unwrap(), "image/jpeg");
        assert_eq!(
            image_mime_type(Path::new("cat.jpeg")).unwrap(),
            "image/jpeg"
        );
        assert_eq!(image_mime_type(Path::new("cat.png")).unwrap(), "image/png");
    }

    #[test]
    fn extension_check_ignores_case() {
        assert_eq!(
            image_mime_type(Path::new("photos/CAT.JPG")).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        assert!(image_mime_type(Path::new("cat.gif")).is_err());
        assert!(image_mime_type(Path::new("cat.webp")).is_err());
        assert!(image_mime_type(Path::new("cat")).is_err());
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = config_path(Some(PathBuf::from("/tmp/other.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/other.toml"));
    }
}
