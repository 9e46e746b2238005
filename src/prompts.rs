pub const AVATAR_SUBJECT: &str = include_str!("../data/prompts/avatar_subject.txt");
pub const AVATAR_ACCESSORY: &str = "It has {{accessory}}.";
pub const AVATAR_DETAIL: &str = "It also has {{detail}}.";
pub const AVATAR_STYLE: &str = include_str!("../data/prompts/avatar_style.txt");
pub const TRANSFORM: &str = include_str!("../data/prompts/transform.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
