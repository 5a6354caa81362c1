#[cfg(test)]
mod common;
#[cfg(test)]
mod test_parser;
#[cfg(test)]
mod test_tree;
