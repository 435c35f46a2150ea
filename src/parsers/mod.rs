pub mod lexer;
pub mod parser_cmd;
