mod api;
pub mod models;

pub use api::{
    edit_image, generate_image, generate_text, inline_image_part, response_to_inline_image,
    response_to_text, send_generate_content, send_predict, text_part, user_content,
};
