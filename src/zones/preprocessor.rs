extern crate pest;

use pest::error::Error;
use pest::iterators::Pair;
use pest::Parser;
use std::result;

#[derive(Parser)]
#[grammar = "zones/preprocessor.pest"]
pub struct ZonePreprocessor;

type Result<T> = result::Result<T, Error<Rule>>;

fn parse_tokens(pair: Pair<Rule>) -> String {
    let mut result = String::new();
    let mut opens = 0_usize;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::open => {
                opens += 1;
                result.push_str(pair.as_str());
            }
            Rule::close => {
                // Unbalanced closes are left for the zone parser to reject.
                opens = opens.saturating_sub(1);
                result.push_str(pair.as_str());
            }
            Rule::newline | Rule::comment => {
                if opens > 0 {
                    // Replace newlines or comments with spaces
                    for _i in 0..pair.as_str().len() {
                        result.push(' ');
                    }
                } else {
                    result.push_str(pair.as_str());
                }
            }
            _ => result.push_str(pair.as_str()),
        }
    }

    result
}

/// Preprocess the input to handle braces. Specifically
/// ( and ) allow a record to span multiple lines, so this
/// replaces new lines with spaces when they are within braces.
/// Quoted strings are copied as is, so a ';' or '(' in a TXT record
/// is not mistaken for a comment or brace.
pub(crate) fn preprocess(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());

    for file in ZonePreprocessor::parse(Rule::file, input)? {
        for pair in file.into_inner() {
            if pair.as_rule() == Rule::tokens {
                result.push_str(&parse_tokens(pair));
            }
        }
    }

    Ok(result)
}
