use pest::Parser;

use crate::types::{Token, TokenKind, TokenList, MAX_TOKENS};

#[derive(pest_derive::Parser)]
#[grammar = "parsers/grammar.pest"]
struct LineLexer;

/// Split a line into words and the symbols `<`, `>`, `>>`, `|`, `&`, `;`.
///
/// Word values are copied out of the line. At most `MAX_TOKENS` tokens are
/// kept; the rest are dropped and the list is marked `truncated`.
pub fn tokenize(line: &str) -> TokenList {
    let mut list = TokenList::default();

    let pairs = match LineLexer::parse(Rule::line, line) {
        Ok(mut pairs) => match pairs.next() {
            Some(pair) => pair.into_inner(),
            None => return list,
        },
        Err(e) => {
            log!("tokenize: grammar rejected {:?}: {}", line, e);
            list.tokens.push(Token::symbol(TokenKind::Invalid));
            return list;
        }
    };

    for pair in pairs {
        let token = match pair.as_rule() {
            Rule::word => Token::word(pair.as_str()),
            Rule::append => Token::symbol(TokenKind::RedirOutAppend),
            Rule::symbol => {
                let c = pair.as_str().chars().next().unwrap_or('\0');
                Token::symbol(TokenKind::from_symbol(c))
            }
            _ => continue,
        };
        if list.tokens.len() == MAX_TOKENS {
            list.truncated = true;
            break;
        }
        list.tokens.push(token);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::tokenize;
    use crate::types::TokenKind::*;
    use crate::types::{Token, MAX_TOKENS};

    fn words(line: &str) -> Vec<String> {
        tokenize(line)
            .tokens
            .into_iter()
            .filter(|t| t.is_word())
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_tokenize_words() {
        assert_eq!(words("ls"), vec!["ls"]);
        assert_eq!(words("  ls  -l\t/tmp  "), vec!["ls", "-l", "/tmp"]);
        assert_eq!(words("echo\x0bhi\r"), vec!["echo", "hi"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t \r ").is_empty());
    }

    #[test]
    fn test_tokenize_symbols() {
        let tl = tokenize("cat<in.txt>out.txt|wc&");
        assert_eq!(
            tl.kinds(),
            vec![Word, RedirIn, Word, RedirOut, Word, Pipe, Word, Background]
        );
        assert_eq!(tl.tokens[2].value, "in.txt");
        assert_eq!(tl.tokens[1].value, "");

        assert_eq!(tokenize("a ; b").kinds(), vec![Word, List, Word]);
    }

    #[test]
    fn test_tokenize_append() {
        assert_eq!(tokenize("echo hi >> log").kinds(), vec![Word, Word, RedirOutAppend, Word]);
        assert_eq!(tokenize(">>").kinds(), vec![RedirOutAppend]);
        assert_eq!(tokenize(">>>").kinds(), vec![RedirOutAppend, RedirOut]);
        assert_eq!(tokenize("> >").kinds(), vec![RedirOut, RedirOut]);
    }

    #[test]
    fn test_tokenize_keeps_characters() {
        let line = " ls -l|grep  foo>>out.txt ; cat<x &";
        let joined: String = tokenize(line)
            .tokens
            .iter()
            .map(|t: &Token| if t.is_word() { t.value.as_str() } else { t.kind.symbol() })
            .collect();
        let expected: String = line.split_whitespace().collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let line = "echo a b | wc -l > out &";
        assert_eq!(tokenize(line), tokenize(line));
    }

    #[test]
    fn test_tokenize_overflow() {
        let line = vec!["w"; MAX_TOKENS].join(" ");
        let tl = tokenize(&line);
        assert_eq!(tl.len(), MAX_TOKENS);
        assert!(!tl.truncated);

        let line = vec!["w"; MAX_TOKENS + 1].join(" ");
        let tl = tokenize(&line);
        assert_eq!(tl.len(), MAX_TOKENS);
        assert!(tl.truncated);
    }
}
