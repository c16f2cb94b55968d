// Text normalization and spelling suggestions for ingredient input

pub mod normalize;
pub mod suggest;

pub use normalize::{lemmatize, normalize};
pub use suggest::{suggest, Suggestion, TermDictionary};
