use std::collections::BTreeSet;
use std::fmt;
use std::os::unix::io::RawFd;

pub const MAX_LINE_LEN: usize = 512;
pub const MAX_TOKENS: usize = 128;
pub const MAX_ARGS: usize = 16;
pub const MAX_PIPELINE_LEN: usize = 8;
pub const MAX_CMD_LIST_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Pipe,
    List,
    RedirOut,
    RedirOutAppend,
    RedirIn,
    Background,
    GroupStart,
    GroupEnd,
    Invalid,
}

impl TokenKind {
    pub fn from_symbol(c: char) -> TokenKind {
        match c {
            '<' => TokenKind::RedirIn,
            '>' => TokenKind::RedirOut,
            '|' => TokenKind::Pipe,
            '&' => TokenKind::Background,
            ';' => TokenKind::List,
            _ => TokenKind::Invalid,
        }
    }

    /// Source text of a punctuation token; empty for words.
    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Word => "",
            TokenKind::Pipe => "|",
            TokenKind::List => ";",
            TokenKind::RedirOut => ">",
            TokenKind::RedirOutAppend => ">>",
            TokenKind::RedirIn => "<",
            TokenKind::Background => "&",
            TokenKind::GroupStart => "(",
            TokenKind::GroupEnd => ")",
            TokenKind::Invalid => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn word(value: &str) -> Token {
        Token {
            kind: TokenKind::Word,
            value: value.to_string(),
        }
    }

    pub fn symbol(kind: TokenKind) -> Token {
        Token {
            kind,
            value: String::new(),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    pub tokens: Vec<Token>,
    /// set when the line held more than `MAX_TOKENS` tokens
    pub truncated: bool,
}

impl TokenList {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tokens")?;
        for (i, t) in self.tokens.iter().enumerate() {
            if t.is_word() {
                writeln!(f, "\tToken[{}]: {:?} value={} len={}", i, t.kind, t.value, t.value.len())?;
            } else {
                writeln!(f, "\tToken[{}]: {:?}", i, t.kind)?;
            }
        }
        if self.truncated {
            writeln!(f, "\t(truncated at {})", MAX_TOKENS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Syntax,
    TooManyArguments,
    MissingRedirectionDestination,
    ArgumentAfterRedirect,
    PipelineTooLong,
    TooManyCommands,
    TooManyTokens,
    UnknownType,
}

impl ErrorKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::TooManyArguments => "too many arguments",
            ErrorKind::MissingRedirectionDestination => "missing redirection destination",
            ErrorKind::ArgumentAfterRedirect => "argument after redirection",
            ErrorKind::PipelineTooLong => "pipeline too long",
            ErrorKind::TooManyCommands => "too many commands",
            ErrorKind::TooManyTokens => "too many tokens",
            ErrorKind::UnknownType => "unknown command type",
        }
    }

    /// Capacity errors mean part of the line was dropped while parsing.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            ErrorKind::TooManyArguments
                | ErrorKind::PipelineTooLong
                | ErrorKind::TooManyCommands
                | ErrorKind::TooManyTokens
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet(BTreeSet<ErrorKind>);

impl ErrorSet {
    pub fn of(kind: ErrorKind) -> ErrorSet {
        let mut errors = ErrorSet::default();
        errors.insert(kind);
        errors
    }

    pub fn insert(&mut self, kind: ErrorKind) {
        self.0.insert(kind);
    }

    pub fn merge(&mut self, other: &ErrorSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_capacity_error(&self) -> bool {
        self.0.iter().any(ErrorKind::is_capacity)
    }

    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("OK");
        }
        let names: Vec<&str> = self.iter().map(|k| k.describe()).collect();
        f.write_str(&names.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
    In,
    Out,
    Append,
    None,
}

/// Replace `source_fd` in the child with either an open descriptor
/// (`dest_fd`) or a file opened from `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub source_fd: RawFd,
    pub dest_fd: Option<RawFd>,
    pub path: Option<String>,
    pub kind: RedirKind,
}

impl Redirection {
    pub fn none(source_fd: RawFd) -> Redirection {
        Redirection {
            source_fd,
            dest_fd: None,
            path: None,
            kind: RedirKind::None,
        }
    }

    pub fn to_path(source_fd: RawFd, kind: RedirKind, path: &str) -> Redirection {
        Redirection {
            source_fd,
            dest_fd: None,
            path: Some(path.to_string()),
            kind,
        }
    }

    pub fn is_set(&self) -> bool {
        self.kind != RedirKind::None
    }
}

///
/// command line: `cat < in.txt > out.txt &` would be:
/// SimpleCommand {
///     argv: ["cat"],
///     redirects: [In("in.txt"), Out("out.txt"), None],
///     errors: {},
///     background: true,
/// }
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    /// indexed by `source_fd`
    pub redirects: [Redirection; 3],
    pub errors: ErrorSet,
    pub background: bool,
}

impl Default for SimpleCommand {
    fn default() -> Self {
        SimpleCommand {
            argv: Vec::new(),
            redirects: [Redirection::none(0), Redirection::none(1), Redirection::none(2)],
            errors: ErrorSet::default(),
            background: false,
        }
    }
}

impl SimpleCommand {
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<SimpleCommand>,
    pub errors: ErrorSet,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_background(&self) -> bool {
        self.commands.iter().any(|c| c.background)
    }
}

/// Pipelines separated by `;`, run left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    pub commands: Vec<Command>,
    pub errors: ErrorSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty(ErrorSet),
    Invalid(ErrorSet),
    Simple(SimpleCommand),
    Pipeline(Pipeline),
    List(CommandList),
}

impl Default for Command {
    fn default() -> Self {
        Command::Empty(ErrorSet::default())
    }
}

impl Command {
    /// Union of the errors of this node and everything below it.
    pub fn errors(&self) -> &ErrorSet {
        match self {
            Command::Empty(errors) | Command::Invalid(errors) => errors,
            Command::Simple(simple) => &simple.errors,
            Command::Pipeline(pipeline) => &pipeline.errors,
            Command::List(list) => &list.errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Command::Empty(_))
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        match self {
            Command::Empty(errors) => writeln!(f, "{}Empty: flags={}", indent, errors),
            Command::Invalid(errors) => writeln!(f, "{}Invalid: flags={}", indent, errors),
            Command::Simple(simple) => write_simple(f, simple, indent),
            Command::Pipeline(pipeline) => {
                writeln!(f, "{}Pipeline: len={} flags={}", indent, pipeline.len(), pipeline.errors)?;
                let inner = format!("{}\t", indent);
                for (i, simple) in pipeline.commands.iter().enumerate() {
                    if i > 0 {
                        writeln!(f, "{}|", inner)?;
                    }
                    write_simple(f, simple, &inner)?;
                }
                writeln!(f, "{}END;", inner)
            }
            Command::List(list) => {
                writeln!(f, "{}List: len={} flags={}", indent, list.commands.len(), list.errors)?;
                let inner = format!("{}\t", indent);
                for cmd in &list.commands {
                    cmd.write_tree(f, &inner)?;
                }
                Ok(())
            }
        }
    }
}

fn write_simple(f: &mut fmt::Formatter<'_>, simple: &SimpleCommand, indent: &str) -> fmt::Result {
    writeln!(f, "{}Simple: cmd={}", indent, simple.name().unwrap_or("(none)"))?;
    for (i, arg) in simple.argv.iter().enumerate() {
        writeln!(f, "{}\targv[{}]={}", indent, i, arg)?;
    }
    for r in simple.redirects.iter().filter(|r| r.is_set()) {
        writeln!(
            f,
            "{}\tREDIRECT: kind={:?} fd={} path={}",
            indent,
            r.kind,
            r.source_fd,
            r.path.as_deref().unwrap_or("")
        )?;
    }
    if simple.background {
        writeln!(f, "{}\tBACKGROUND", indent)?;
    }
    writeln!(f, "{}\tFlags={}", indent, simple.errors)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_set_is_additive() {
        let mut a = ErrorSet::of(ErrorKind::Syntax);
        let mut b = ErrorSet::of(ErrorKind::ArgumentAfterRedirect);
        b.insert(ErrorKind::Syntax);
        a.merge(&b);
        assert!(a.contains(ErrorKind::Syntax));
        assert!(a.contains(ErrorKind::ArgumentAfterRedirect));
        assert!(!a.has_capacity_error());
        assert_eq!(a.iter().count(), 2);

        a.insert(ErrorKind::PipelineTooLong);
        assert!(a.has_capacity_error());
    }

    #[test]
    fn test_simple_default_slots() {
        let simple = SimpleCommand::default();
        for (i, r) in simple.redirects.iter().enumerate() {
            assert_eq!(r.source_fd, i as RawFd);
            assert_eq!(r.kind, RedirKind::None);
            assert!(r.path.is_none());
            assert!(r.dest_fd.is_none());
        }
        assert_eq!(simple.name(), None);
        assert!(simple.is_empty());
    }

    #[test]
    fn test_command_display() {
        let mut simple = SimpleCommand::default();
        simple.argv = vec!["cat".to_string()];
        simple.redirects[1] = Redirection::to_path(1, RedirKind::Out, "out.txt");
        let text = Command::Simple(simple).to_string();
        assert!(text.starts_with("Simple: cmd=cat\n"));
        assert!(text.contains("REDIRECT: kind=Out fd=1 path=out.txt"));
        assert!(text.contains("Flags=OK"));
    }
}
