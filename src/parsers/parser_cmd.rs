use crate::types::{
    Command, CommandList, ErrorKind, ErrorSet, Pipeline, RedirKind, Redirection, SimpleCommand,
    Token, TokenKind, TokenList, MAX_ARGS, MAX_CMD_LIST_LEN, MAX_PIPELINE_LEN,
};

/// Parse `WORD WORD* redirect* &?` from a pipe-free slice of tokens.
///
/// Problems are recorded in `errors` rather than aborting; a nameless
/// result (e.g. `> out`) is an empty command.
pub fn parse_simple_command(tokens: &[Token]) -> SimpleCommand {
    let mut simple = SimpleCommand::default();
    let tail = tokens.len();
    let mut p = 0;

    while p < tail && tokens[p].is_word() {
        if simple.argc() == MAX_ARGS {
            simple.errors.insert(ErrorKind::TooManyArguments);
            return simple;
        }
        simple.argv.push(tokens[p].value.clone());
        p += 1;
    }

    while p < tail {
        let (fd, kind) = match tokens[p].kind {
            TokenKind::RedirIn => (0, RedirKind::In),
            TokenKind::RedirOut => (1, RedirKind::Out),
            TokenKind::RedirOutAppend => (1, RedirKind::Append),
            TokenKind::Background => {
                simple.background = true;
                p += 1;
                continue;
            }
            TokenKind::Word => {
                simple.errors.insert(ErrorKind::ArgumentAfterRedirect);
                simple.errors.insert(ErrorKind::Syntax);
                return simple;
            }
            other => {
                log!("parse: unexpected token {:?}", other);
                simple.errors.insert(ErrorKind::Syntax);
                p += 1;
                continue;
            }
        };

        match tokens.get(p + 1) {
            Some(dest) if dest.is_word() => {
                // a later redirection of the same fd replaces the earlier one
                simple.redirects[fd] = Redirection::to_path(fd as i32, kind, &dest.value);
            }
            _ => {
                simple.errors.insert(ErrorKind::MissingRedirectionDestination);
                return simple;
            }
        }
        p += 2;
    }
    simple
}

/// Parse `simple ("|" simple)*`.
pub fn parse_pipeline(tokens: &[Token]) -> Command {
    let mut used = 0;
    parse_pipeline_counted(tokens, &mut used)
}

/// `used` is the number of simple commands already parsed on this line.
fn parse_pipeline_counted(tokens: &[Token], used: &mut usize) -> Command {
    // nothing between two `;` costs nothing
    if tokens.is_empty() {
        return Command::Empty(ErrorSet::default());
    }
    let segments: Vec<&[Token]> = tokens.split(|t| t.kind == TokenKind::Pipe).collect();

    if *used + segments.len() > MAX_CMD_LIST_LEN {
        let mut errors = ErrorSet::of(ErrorKind::TooManyCommands);
        if segments.len() > MAX_PIPELINE_LEN {
            errors.insert(ErrorKind::PipelineTooLong);
        }
        return Command::Invalid(errors);
    }
    *used += segments.len();

    if segments.len() == 1 {
        let simple = parse_simple_command(segments[0]);
        if simple.errors.has_capacity_error() {
            return Command::Invalid(simple.errors);
        }
        if simple.is_empty() {
            return Command::Empty(simple.errors);
        }
        return Command::Simple(simple);
    }

    let mut pipeline = Pipeline::default();
    if segments.len() > MAX_PIPELINE_LEN {
        pipeline.errors.insert(ErrorKind::PipelineTooLong);
    }
    for segment in segments {
        let simple = parse_simple_command(segment);
        pipeline.errors.merge(&simple.errors);
        pipeline.commands.push(simple);
    }

    if pipeline.errors.has_capacity_error() {
        Command::Invalid(pipeline.errors)
    } else {
        Command::Pipeline(pipeline)
    }
}

/// Parse a whole line: pipelines separated by `;`.
pub fn parse_command(tokens: &TokenList) -> Command {
    if tokens.truncated {
        return Command::Invalid(ErrorSet::of(ErrorKind::TooManyTokens));
    }

    let mut used = 0;
    let mut list = CommandList::default();
    for part in tokens.tokens.split(|t| t.kind == TokenKind::List) {
        let cmd = parse_pipeline_counted(part, &mut used);
        if cmd.errors().has_capacity_error() {
            return Command::Invalid(cmd.errors().clone());
        }
        list.errors.merge(cmd.errors());
        if !cmd.is_empty() {
            list.commands.push(cmd);
        }
    }

    match list.commands.len() {
        0 => Command::Empty(list.errors),
        1 if list.errors == *list.commands[0].errors() => list.commands.remove(0),
        _ => Command::List(list),
    }
}
