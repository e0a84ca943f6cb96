//! Chat slash-commands and the media URLs the server hands out.

/// First demo clip, returned for every video request.
pub const DEMO_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Clip reported by the status endpoint.
pub const STATUS_VIDEO_URL: &str = "https://www.w3schools.com/html/mov_bbb.mp4";

/// Image model named in replies.
pub const IMAGE_MODEL: &str = "flux (pollinations)";

const POLLINATIONS_BASE: &str = "https://image.pollinations.ai/prompt";
const SQUARE_SIZE: &str = "1024x1024";

/// Chat message handled without a completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/image <prompt>`; the prompt may be empty.
    Image(String),
    /// `/video ...`
    Video,
    /// `/slides ...`
    Slides,
}

impl ChatCommand {
    /// Command at the start of `message`, if any.
    #[must_use]
    pub fn parse(message: &str) -> Option<Self> {
        if let Some(rest) = message.strip_prefix("/image") {
            Some(Self::Image(rest.trim().to_string()))
        } else if message.starts_with("/video") {
            Some(Self::Video)
        } else if message.starts_with("/slides") {
            Some(Self::Slides)
        } else {
            None
        }
    }
}

/// Reply to `/image` without a prompt.
pub const IMAGE_USAGE: &str = "🎨 Describe what you want after the /image command\n\nExample: `/image a cat playing in the garden`";

/// Reply to `/video`.
pub const VIDEO_HINT: &str =
    "🎬 To create videos, open the Video Editor from the sidebar and describe the clip you want.";

/// Reply to `/slides`.
pub const SLIDES_HINT: &str =
    "📊 To create presentations, open the Presentation Editor from the sidebar and give it a topic.";

/// Markdown reply embedding a generated image.
#[must_use]
pub fn image_reply(prompt: &str, url: &str) -> String {
    format!(
        "🎨 **Image generated for:** \"{prompt}\"\n\n![Generated image]({url})\n\n*Click the image to view it full screen*"
    )
}

/// Image URL of the free Pollinations service. `1024x1024` is square;
/// every other size is landscape 1024x576.
#[must_use]
pub fn pollinations_url(prompt: &str, size: &str, seed: i64) -> String {
    let (width, height) = if size == SQUARE_SIZE {
        (1024, 1024)
    } else {
        (1024, 576)
    };
    format!(
        "{POLLINATIONS_BASE}/{}?width={width}&height={height}&model=flux&nologo=true&enhance=true&seed={seed}",
        urlencoding::encode(prompt)
    )
}
