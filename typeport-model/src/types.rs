use serde::{Deserialize, Serialize};

use crate::{Error, Result, TypeKey};

/// Structural classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Primitive,
    Collection,
    Dictionary,
    #[serde(rename = "generic-parameter")]
    GenericParameter,
}

/// Reference to a type at a usage site (a member's declared type, a generic
/// argument, a method parameter).
///
/// A ref carries no structure of its own; the referenced type's kind and
/// members are resolved lazily through the metadata provider, never owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Key of the referenced type.
    pub key: TypeKey,
    /// Generic arguments, in declaration order. Empty for non-generic uses.
    #[serde(default)]
    pub args: Vec<TypeRef>,
    /// Whether the reference admits null.
    #[serde(default)]
    pub nullable: bool,
}

impl TypeRef {
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            args: Vec::new(),
            nullable: false,
        }
    }

    /// A non-generic, non-nullable reference by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(TypeKey::simple(name))
    }

    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.key = TypeKey::new(self.key.name(), args.len());
        self.args = args;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Parse a textual type expression into a [`TypeRef`].
///
/// Grammar: `Name`, `Name<Expr, Expr>`, `Expr[]` (array sugar), and a
/// trailing `?` for nullability. Names may contain `.` separators.
///
/// ```
/// use typeport_model::parse_type_expr;
///
/// let r = parse_type_expr("Map<string, Order>?").unwrap();
/// assert_eq!(r.key.name(), "Map");
/// assert_eq!(r.args.len(), 2);
/// assert!(r.nullable);
/// ```
pub fn parse_type_expr(expr: &str) -> Result<TypeRef> {
    let mut parser = ExprParser {
        expr,
        chars: expr.char_indices().peekable(),
    };
    let reference = parser.parse_ref()?;
    parser.skip_ws();
    if let Some((pos, c)) = parser.chars.next() {
        return Err(parser.fail(format!("unexpected '{c}' at offset {pos}")));
    }
    Ok(reference)
}

struct ExprParser<'a> {
    expr: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl ExprParser<'_> {
    fn parse_ref(&mut self) -> Result<TypeRef> {
        self.skip_ws();
        let name = self.parse_name()?;
        let mut args = Vec::new();

        if self.eat('<') {
            loop {
                args.push(self.parse_ref()?);
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.fail("expected ',' or '>' in generic argument list"));
            }
        }

        let mut reference = TypeRef {
            key: TypeKey::new(name, args.len()),
            args,
            nullable: false,
        };

        // Array sugar: T[] is a collection of T.
        loop {
            self.skip_ws();
            if self.eat('[') {
                if !self.eat(']') {
                    return Err(self.fail("expected ']' after '['"));
                }
                reference = TypeRef {
                    key: TypeKey::new("Array", 1),
                    args: vec![reference],
                    nullable: false,
                };
            } else {
                break;
            }
        }

        if self.eat('?') {
            reference.nullable = true;
        }
        Ok(reference)
    }

    fn parse_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.fail("expected a type name"));
        }
        Ok(name)
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn fail(&self, reason: impl Into<String>) -> Box<Error> {
        Box::new(Error::TypeExpr {
            expr: self.expr.to_string(),
            reason: reason.into(),
        })
    }
}
