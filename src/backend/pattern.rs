//! SQL `ILIKE` semantics: `%` matches any run, `_` a single character,
//! and `\` escapes the next character.

const ESCAPE: char = '\\';

/// Escape `%`, `_` and `\` so `term` only matches itself.
#[must_use]
pub fn escape_like(term: &str) -> String {
	let mut escaped = String::with_capacity(term.len());
	for ch in term.chars() {
		if matches!(ch, '%' | '_' | ESCAPE) {
			escaped.push(ESCAPE);
		}
		escaped.push(ch);
	}
	escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
	Any,
	One,
	Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
	let mut tokens = Vec::with_capacity(pattern.len());
	let mut chars = pattern.chars().flat_map(char::to_lowercase);
	while let Some(ch) = chars.next() {
		let token = match ch {
			'%' => Token::Any,
			'_' => Token::One,
			// A trailing escape matches a literal backslash.
			ESCAPE => Token::Literal(chars.next().unwrap_or(ESCAPE)),
			other => Token::Literal(other),
		};
		tokens.push(token);
	}
	tokens
}

/// Case-insensitive pattern match of `text` against `pattern`.
#[must_use]
pub fn ilike(pattern: &str, text: &str) -> bool {
	let tokens = tokenize(pattern);
	let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

	let (mut t, mut p) = (0, 0);
	// Last `%` seen and the text position it is currently absorbing up to.
	let mut backtrack: Option<(usize, usize)> = None;

	while t < text.len() {
		match tokens.get(p) {
			Some(Token::One) => {
				t += 1;
				p += 1;
			}
			Some(Token::Literal(ch)) if *ch == text[t] => {
				t += 1;
				p += 1;
			}
			Some(Token::Any) => {
				backtrack = Some((p, t));
				p += 1;
			}
			_ => match backtrack {
				Some((star, absorbed)) => {
					p = star + 1;
					t = absorbed + 1;
					backtrack = Some((star, absorbed + 1));
				}
				None => return false,
			},
		}
	}

	tokens[p..].iter().all(|token| *token == Token::Any)
}
