mod answer_code_question;
mod generate_learning_path;

pub use answer_code_question::*;
pub use generate_learning_path::*;
