//! Stack-based structural parser.
//!
//! Single pass over the character stream: document-begin pushes a synthetic
//! root, node-begin creates a child under the current top-of-stack and
//! pushes it, composite callbacks mutate the top-of-stack, node-end attaches
//! trailing comments and pops. The output is a [`DocNode`] tree, never an
//! entity — the dispatcher does that.

use crate::{DocNode, ParseError, ParseResult, Span, DOC_ROOT};
use modl_core::Origin;
use std::sync::Arc;

/// Parses one file's source text into a document tree rooted at the
/// synthetic `doc-root` node.
pub fn parse_str(input: &str, file: &str) -> ParseResult<DocNode> {
    Parser::new(input, file).parse()
}

/// Parser state.
pub struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    file: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, file: &str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            file: Arc::from(file),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn parse(mut self) -> ParseResult<DocNode> {
        let mut stack = vec![DocNode::new(
            DOC_ROOT,
            "",
            Origin::new(self.file.clone(), 1, 1),
        )];
        let mut pending_comments: Vec<String> = Vec::new();

        loop {
            self.skip_whitespace();

            let start = self.pos;
            let start_line = self.line;
            let start_col = self.column;

            let Some(c) = self.peek_char() else {
                break;
            };

            match c {
                '#' => {
                    self.next_char();
                    let line = self.read_line();
                    pending_comments.push(line.trim().to_string());
                }
                '}' => {
                    self.next_char();
                    if stack.len() == 1 {
                        return Err(ParseError::new(
                            "unbalanced '}'",
                            self.span_from(start, start_line, start_col),
                        ));
                    }
                    // Comments between the last child and the brace attach
                    // to the closing node.
                    let mut node = stack.pop().expect("non-empty stack");
                    for comment in pending_comments.drain(..) {
                        node.push_comment(comment);
                    }
                    stack
                        .last_mut()
                        .expect("root stays on the stack")
                        .add_child(node);
                }
                c if is_tag_start(c) => {
                    let tag = self.read_tag();
                    let origin = Origin::new(self.file.clone(), start_line, start_col);
                    let parent_path = stack.last().expect("non-empty stack").path().to_string();
                    let mut node = DocNode::new(tag, &parent_path, origin);
                    for comment in pending_comments.drain(..) {
                        node.push_comment(comment);
                    }

                    if self.peek_char() == Some('<') {
                        let text = self.read_delimited('<', '>', start, start_line, start_col)?;
                        node.apply_composite(&text).map_err(|cause| {
                            ParseError::new(cause, self.span_from(start, start_line, start_col))
                        })?;
                    }
                    if self.peek_char() == Some('[') {
                        let text = self.read_delimited('[', ']', start, start_line, start_col)?;
                        node.apply_composite(&text).map_err(|cause| {
                            ParseError::new(cause, self.span_from(start, start_line, start_col))
                        })?;
                    }

                    self.skip_whitespace();
                    if self.peek_char() == Some('{') {
                        self.next_char();
                        stack.push(node);
                    } else {
                        stack
                            .last_mut()
                            .expect("non-empty stack")
                            .add_child(node);
                    }
                }
                _ => {
                    return Err(ParseError::new(
                        format!("unexpected character '{}'", c),
                        self.span_from(start, start_line, start_col),
                    ));
                }
            }
        }

        if stack.len() != 1 {
            return Err(ParseError::unexpected_eof(self.current_span(), "'}'"));
        }
        let mut root = stack.pop().expect("root");
        for comment in pending_comments.drain(..) {
            root.push_comment(comment);
        }
        Ok(root)
    }

    fn current_span(&self) -> Span {
        Span::new(self.pos, self.pos, self.line, self.column)
    }

    fn span_from(&self, start: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start, self.pos, start_line, start_col)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn next_char(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.pos = pos + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            line.push(c);
            self.next_char();
        }
        line
    }

    fn read_tag(&mut self) -> String {
        let mut tag = String::new();
        while let Some(c) = self.peek_char() {
            if is_tag_char(c) {
                tag.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        tag
    }

    /// Reads text between `open` and `close`, honoring double quotes so a
    /// quoted value may contain the closing character.
    fn read_delimited(
        &mut self,
        open: char,
        close: char,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<String> {
        debug_assert_eq!(self.peek_char(), Some(open));
        self.next_char();

        let mut text = String::new();
        let mut in_quote = false;
        loop {
            match self.next_char() {
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.span_from(start, start_line, start_col),
                        &format!("'{}'", close),
                    ));
                }
                Some('"') => {
                    in_quote = !in_quote;
                    text.push('"');
                }
                Some(c) if c == close && !in_quote => break,
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }
}

fn is_tag_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
