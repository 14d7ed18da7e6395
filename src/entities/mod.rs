pub mod filme;
