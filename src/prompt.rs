use crate::models::{ChatCompletionRequest, ChatMessage};

pub const TEMPERATURE: f32 = 0.2;
pub const TOP_P: f32 = 0.9;
pub const MAX_TOKENS: u32 = 4000;

pub const SYSTEM_PROMPT: &str = "You are a professional web developer. Your task is to convert website sketches into clean, responsive HTML and CSS code.";

pub fn build_user_prompt(description: &str) -> String {
    format!(
        "I have a hand-drawn sketch of a website with the following description:
{description}

Please generate clean, responsive HTML and CSS code for this website.
The website should be modern and professional.

Requirements:
1. Use semantic HTML5 elements
2. Use CSS Grid or Flexbox for layout
3. Make it responsive for different screen sizes
4. Use a clean color scheme
5. Include appropriate spacing and typography
6. Add comments to explain the structure

Return the code in this format:

HTML:
<!DOCTYPE html>...

CSS:
/* CSS code here */
"
    )
}

pub fn build_request(description: &str, model: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(description)),
        ],
        temperature: TEMPERATURE,
        top_p: TOP_P,
        max_tokens: MAX_TOKENS,
        model: model.to_string(),
    }
}
