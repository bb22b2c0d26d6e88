//! Triple-backtick fence scanning.
//!
//! Both entry points walk the input once, line by line, with a two-state
//! machine (outside a fence, inside a fence). A fence line is any line
//! starting with three backticks; the rest of an opening fence line,
//! trimmed, is the language tag, and the closing line's tag is ignored.
//!
//! The two modes differ on purpose at end of input: [`extract_code_blocks`]
//! drops an unterminated block so summaries never carry half-written code,
//! while [`split_segments`] keeps it so nothing being displayed is lost.

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain lines between fences, joined by `\n`.
    Text(String),
    Code {
        block: CodeBlock,
        /// The opening fence line as written.
        opening: String,
        /// `None` when input ended before a closing fence.
        closing: Option<String>,
        body_lines: usize,
    },
}

impl Segment {
    /// The source lines this segment covers, joined by `\n`.
    pub fn raw(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Code {
                block,
                opening,
                closing,
                body_lines,
            } => {
                let mut lines = vec![opening.as_str()];
                if *body_lines > 0 {
                    lines.push(block.body.as_str());
                }
                if let Some(closing) = closing {
                    lines.push(closing.as_str());
                }
                lines.join("\n")
            }
        }
    }
}

/// Rebuilds the scanned input from its segments.
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::raw)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_fence(line: &str) -> bool {
    line.starts_with(FENCE)
}

fn fence_language(line: &str) -> String {
    line[FENCE.len()..].trim().to_string()
}

struct OpenFence<'a> {
    opening: &'a str,
    language: String,
    body: Vec<&'a str>,
}

impl<'a> OpenFence<'a> {
    fn new(opening: &'a str) -> Self {
        Self {
            opening,
            language: fence_language(opening),
            body: Vec::new(),
        }
    }

    fn to_block(&self) -> CodeBlock {
        CodeBlock {
            language: self.language.clone(),
            body: self.body.join("\n"),
        }
    }

    fn into_segment(self, closing: Option<&str>) -> Segment {
        Segment::Code {
            block: self.to_block(),
            opening: self.opening.to_string(),
            closing: closing.map(ToString::to_string),
            body_lines: self.body.len(),
        }
    }
}

/// Fenced blocks only, in order. Whitespace-only bodies and an
/// unterminated trailing block are dropped.
pub fn extract_code_blocks(input: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenFence<'_>> = None;

    for line in input.split('\n') {
        if is_fence(line) {
            match open.take() {
                Some(fence) => {
                    let block = fence.to_block();
                    if !block.body.trim().is_empty() {
                        blocks.push(block);
                    }
                }
                None => open = Some(OpenFence::new(line)),
            }
        } else if let Some(fence) = open.as_mut() {
            fence.body.push(line);
        }
    }

    blocks
}

/// Partitions the input into alternating text and code segments with no
/// gaps: [`join_segments`] on the result reproduces the input exactly.
pub fn split_segments(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text: Vec<&str> = Vec::new();
    let mut open: Option<OpenFence<'_>> = None;

    for line in input.split('\n') {
        if is_fence(line) {
            match open.take() {
                Some(fence) => segments.push(fence.into_segment(Some(line))),
                None => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(text.join("\n")));
                        text.clear();
                    }
                    open = Some(OpenFence::new(line));
                }
            }
        } else if let Some(fence) = open.as_mut() {
            fence.body.push(line);
        } else {
            text.push(line);
        }
    }

    if let Some(fence) = open {
        segments.push(fence.into_segment(None));
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.join("\n")));
    }

    segments
}
