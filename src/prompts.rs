pub const CHAT_GREETING: &str = include_str!("../data/prompts/chat_greeting.txt");
pub const CHAT_IMAGE_ONLY: &str = include_str!("../data/prompts/chat_image_only.txt");
pub const ROOM_PLACEMENT: &str = include_str!("../data/prompts/room_placement.txt");
pub const COMPOSITION_WRAPPER: &str = include_str!("../data/prompts/composition_wrapper.txt");
pub const VIDEO_PARALLAX: &str = include_str!("../data/prompts/video_parallax.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.trim_end().to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
