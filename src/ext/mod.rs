mod lexical_path_ext;

pub use lexical_path_ext::LexicalPathExt;
