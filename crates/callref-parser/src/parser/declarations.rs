//! Declaration stubs.
//!
//! Stubs describe the environment a reference is resolved in: classes,
//! objects, functions, properties, local variables and type parameters in
//! scope. They are a small Kotlin-like header language:
//!
//! ```text
//! package a.b
//! class Foo<T, reified R : Any> : Base {
//!     constructor(x: Int)
//!     fun bar(x: Int): String
//!     var name: String private set
//!     companion object { fun create(): Foo<Int, Int> }
//! }
//! object Obj { fun foo() }
//! suspend fun load(): String
//! fun Foo<*, *>.ext(): Int
//! local var x: Int?
//! typeparam reified T
//! ```

use super::scanner::{TokenCursor, TokenKind, scan};
use super::{ParseError, ParseResult};
use callref_common::Span;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_suspend: bool,
}

/// A type as written in a stub. `None` arguments are star projections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRefAst {
    pub qualifier: Vec<String>,
    pub args: Vec<Option<TypeRefAst>>,
    pub nullable: bool,
    pub span: Span,
}

impl TypeRefAst {
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.qualifier.last().map_or("", String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: String,
    pub reified: bool,
    pub bound: Option<TypeRefAst>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRefAst,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub span: Span,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParamDecl>,
    pub receiver: Option<TypeRefAst>,
    pub params: Vec<ParamDecl>,
    /// `None` means the stub omitted the return type (`Unit`).
    pub return_type: Option<TypeRefAst>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub span: Span,
    pub modifiers: Modifiers,
    pub is_var: bool,
    pub receiver: Option<TypeRefAst>,
    pub ty: TypeRefAst,
    /// Visibility of the setter when it differs from the property's.
    pub setter_visibility: Option<Visibility>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub span: Span,
    pub visibility: Visibility,
    pub params: Vec<ParamDecl>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    CompanionObject,
    AnnotationClass,
    EnumClass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassMember {
    Function(FunctionDecl),
    Property(PropertyDecl),
    Constructor(ConstructorDecl),
    Class(ClassDecl),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub span: Span,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub type_params: Vec<TypeParamDecl>,
    pub supertypes: Vec<TypeRefAst>,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDecl {
    pub name: String,
    pub span: Span,
    pub is_var: bool,
    pub ty: TypeRefAst,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Class(ClassDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
    Local(LocalDecl),
    TypeParam(TypeParamDecl),
}

/// Declarations that follow one `package` header (or the file start).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageBlock {
    /// Empty for the default package.
    pub path: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclFile {
    pub packages: Vec<PackageBlock>,
}

impl DeclFile {
    pub fn items(&self) -> impl Iterator<Item = (&[String], &Item)> {
        self.packages
            .iter()
            .flat_map(|block| block.items.iter().map(move |item| (block.path.as_slice(), item)))
    }
}

/// Parse a declaration stub file.
pub fn parse_declarations(source: &str) -> ParseResult<DeclFile> {
    let tokens = scan(source)?;
    let mut parser = DeclParser {
        cursor: TokenCursor::new(tokens),
    };
    let file = parser.parse_file()?;
    tracing::debug!(
        packages = file.packages.len(),
        items = file.items().count(),
        "parsed declaration stubs"
    );
    Ok(file)
}

struct DeclParser {
    cursor: TokenCursor,
}

impl DeclParser {
    fn parse_file(&mut self) -> ParseResult<DeclFile> {
        let mut file = DeclFile::default();
        let mut current = PackageBlock::default();
        while !self.cursor.at(&TokenKind::Eof) {
            if self.cursor.eat_ident("package") {
                if !current.items.is_empty() || !current.path.is_empty() {
                    file.packages.push(std::mem::take(&mut current));
                }
                current.path = self.parse_dotted_path()?;
                continue;
            }
            if self.cursor.eat_ident("local") {
                current.items.push(Item::Local(self.parse_local()?));
                continue;
            }
            if self.cursor.eat_ident("typeparam") {
                current.items.push(Item::TypeParam(self.parse_type_param()?));
                continue;
            }
            let item = match self.parse_member()? {
                ClassMember::Function(function) => Item::Function(function),
                ClassMember::Property(property) => Item::Property(property),
                ClassMember::Class(class) => Item::Class(class),
                ClassMember::Constructor(ctor) => {
                    return Err(ParseError::new(
                        "constructors are only allowed inside a class body",
                        ctor.span,
                    ));
                }
            };
            current.items.push(item);
        }
        file.packages.push(current);
        Ok(file)
    }

    fn parse_dotted_path(&mut self) -> ParseResult<Vec<String>> {
        let mut path = vec![self.cursor.expect_ident("a package name")?.0];
        while self.cursor.eat(&TokenKind::Dot) {
            path.push(self.cursor.expect_ident("a package name")?.0);
        }
        Ok(path)
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            let visibility = match &self.cursor.peek().kind {
                TokenKind::Ident(word) => match word.as_str() {
                    "public" => Some(Visibility::Public),
                    "internal" => Some(Visibility::Internal),
                    "protected" => Some(Visibility::Protected),
                    "private" => Some(Visibility::Private),
                    "static" => {
                        modifiers.is_static = true;
                        None
                    }
                    "suspend" => {
                        modifiers.is_suspend = true;
                        None
                    }
                    _ => return modifiers,
                },
                _ => return modifiers,
            };
            if let Some(visibility) = visibility {
                modifiers.visibility = visibility;
            }
            self.cursor.bump();
        }
    }

    fn parse_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.cursor.peek().span.start;
        let modifiers = self.parse_modifiers();

        if self.cursor.eat_ident("fun") {
            return Ok(ClassMember::Function(self.parse_function(start, modifiers)?));
        }
        if self.cursor.at_ident("val") || self.cursor.at_ident("var") {
            let is_var = self.cursor.bump().is_ident("var");
            return Ok(ClassMember::Property(
                self.parse_property(start, modifiers, is_var)?,
            ));
        }
        if self.cursor.eat_ident("constructor") {
            let params = self.parse_params()?;
            return Ok(ClassMember::Constructor(ConstructorDecl {
                span: Span::new(start, self.cursor.previous_end()),
                visibility: modifiers.visibility,
                params,
            }));
        }

        let kind = if self.cursor.eat_ident("class") {
            ClassKind::Class
        } else if self.cursor.eat_ident("interface") {
            ClassKind::Interface
        } else if self.cursor.eat_ident("object") {
            ClassKind::Object
        } else if self.cursor.eat_ident("companion") {
            if !self.cursor.eat_ident("object") {
                return Err(self.cursor.unexpected("'object'"));
            }
            ClassKind::CompanionObject
        } else if self.cursor.eat_ident("annotation") {
            if !self.cursor.eat_ident("class") {
                return Err(self.cursor.unexpected("'class'"));
            }
            ClassKind::AnnotationClass
        } else if self.cursor.eat_ident("enum") {
            if !self.cursor.eat_ident("class") {
                return Err(self.cursor.unexpected("'class'"));
            }
            ClassKind::EnumClass
        } else {
            return Err(self.cursor.unexpected("a declaration"));
        };
        Ok(ClassMember::Class(
            self.parse_class(start, modifiers.visibility, kind)?,
        ))
    }

    fn parse_class(
        &mut self,
        start: u32,
        visibility: Visibility,
        kind: ClassKind,
    ) -> ParseResult<ClassDecl> {
        let name = if kind == ClassKind::CompanionObject
            && !matches!(self.cursor.peek().kind, TokenKind::Ident(_))
        {
            "Companion".to_string()
        } else {
            self.cursor.expect_ident("a class name")?.0
        };
        let type_params = self.parse_type_params()?;

        let mut supertypes = Vec::new();
        if self.cursor.eat(&TokenKind::Colon) {
            loop {
                supertypes.push(self.parse_type()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let mut members = Vec::new();
        if self.cursor.eat(&TokenKind::LBrace) {
            while !self.cursor.at(&TokenKind::RBrace) {
                if self.cursor.at(&TokenKind::Eof) {
                    return Err(self.cursor.unexpected("'}'"));
                }
                members.push(self.parse_member()?);
            }
            self.cursor.bump();
        }

        Ok(ClassDecl {
            name,
            span: Span::new(start, self.cursor.previous_end()),
            kind,
            visibility,
            type_params,
            supertypes,
            members,
        })
    }

    fn parse_function(&mut self, start: u32, modifiers: Modifiers) -> ParseResult<FunctionDecl> {
        let type_params = self.parse_type_params()?;
        let (receiver, name) = self.parse_receiver_and_name()?;
        let params = self.parse_params()?;
        let return_type = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(FunctionDecl {
            name,
            span: Span::new(start, self.cursor.previous_end()),
            modifiers,
            type_params,
            receiver,
            params,
            return_type,
        })
    }

    fn parse_property(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        is_var: bool,
    ) -> ParseResult<PropertyDecl> {
        let (receiver, name) = self.parse_receiver_and_name()?;
        self.cursor.expect(&TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;

        let mut setter_visibility = None;
        let setter_word = match &self.cursor.peek().kind {
            TokenKind::Ident(word) => match word.as_str() {
                "public" => Some(Visibility::Public),
                "internal" => Some(Visibility::Internal),
                "protected" => Some(Visibility::Protected),
                "private" => Some(Visibility::Private),
                _ => None,
            },
            _ => None,
        };
        if let Some(visibility) = setter_word {
            if self.cursor.peek_nth(1).is_ident("set") {
                self.cursor.bump();
                self.cursor.bump();
                setter_visibility = Some(visibility);
            }
        }

        Ok(PropertyDecl {
            name,
            span: Span::new(start, self.cursor.previous_end()),
            modifiers,
            is_var,
            receiver,
            ty,
            setter_visibility,
        })
    }

    /// `name` or `Receiver.name`, where the receiver may itself be dotted
    /// and carry type arguments (`Foo<*>.name`, `a.b.Foo.name`).
    fn parse_receiver_and_name(&mut self) -> ParseResult<(Option<TypeRefAst>, String)> {
        let ty = self.parse_type()?;
        if self.cursor.eat(&TokenKind::Dot) {
            let (name, _) = self.cursor.expect_ident("a member name")?;
            return Ok((Some(ty), name));
        }
        if !ty.args.is_empty() || ty.nullable {
            return Err(ParseError::new("expected a member name", ty.span));
        }
        let mut qualifier = ty.qualifier;
        let name = qualifier.pop().unwrap_or_default();
        if qualifier.is_empty() {
            return Ok((None, name));
        }
        let receiver = TypeRefAst {
            qualifier,
            args: Vec::new(),
            nullable: false,
            span: ty.span,
        };
        Ok((Some(receiver), name))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<ParamDecl>> {
        self.cursor.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.cursor.at(&TokenKind::RParen) {
            loop {
                let (name, _) = self.cursor.expect_ident("a parameter name")?;
                self.cursor.expect(&TokenKind::Colon, "':'")?;
                let ty = self.parse_type()?;
                params.push(ParamDecl { name, ty });
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(&TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn parse_type_params(&mut self) -> ParseResult<Vec<TypeParamDecl>> {
        let mut params = Vec::new();
        if !self.cursor.eat(&TokenKind::Less) {
            return Ok(params);
        }
        loop {
            params.push(self.parse_type_param()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::Greater, "'>'")?;
        Ok(params)
    }

    fn parse_type_param(&mut self) -> ParseResult<TypeParamDecl> {
        let start = self.cursor.peek().span.start;
        let reified = self.cursor.eat_ident("reified");
        let (name, _) = self.cursor.expect_ident("a type parameter name")?;
        let bound = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(TypeParamDecl {
            name,
            reified,
            bound,
            span: Span::new(start, self.cursor.previous_end()),
        })
    }

    fn parse_local(&mut self) -> ParseResult<LocalDecl> {
        let start = self.cursor.peek().span.start;
        let is_var = if self.cursor.eat_ident("var") {
            true
        } else if self.cursor.eat_ident("val") {
            false
        } else {
            return Err(self.cursor.unexpected("'val' or 'var'"));
        };
        let (name, _) = self.cursor.expect_ident("a variable name")?;
        self.cursor.expect(&TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        Ok(LocalDecl {
            name,
            span: Span::new(start, self.cursor.previous_end()),
            is_var,
            ty,
        })
    }

    /// `IDENT ('.' IDENT)* type_args? '?'*`
    ///
    /// A dot followed by something other than an identifier ends the type, so
    /// the caller can read `Foo<*>.name` as receiver plus name.
    fn parse_type(&mut self) -> ParseResult<TypeRefAst> {
        let (first, first_span) = self.cursor.expect_ident("a type")?;
        let mut qualifier = vec![first];
        let mut args = Vec::new();
        loop {
            if self.cursor.at(&TokenKind::Less) {
                args = self.parse_type_args()?;
                break;
            }
            let continues = self.cursor.at(&TokenKind::Dot)
                && matches!(self.cursor.peek_nth(1).kind, TokenKind::Ident(_))
                && self.dot_continues_type();
            if !continues {
                break;
            }
            self.cursor.bump();
            qualifier.push(self.cursor.expect_ident("a type")?.0);
        }
        let mut nullable = false;
        while self.cursor.eat(&TokenKind::Question) {
            nullable = true;
        }
        Ok(TypeRefAst {
            qualifier,
            args,
            nullable,
            span: Span::new(first_span.start, self.cursor.previous_end()),
        })
    }

    /// In `fun a.B.name(...)` the last segment is the member name: a dotted
    /// segment continues the type only if it is not directly followed by the
    /// parameter list or the property's `:`.
    fn dot_continues_type(&self) -> bool {
        !matches!(
            self.cursor.peek_nth(2).kind,
            TokenKind::LParen | TokenKind::Colon
        )
    }

    fn parse_type_args(&mut self) -> ParseResult<Vec<Option<TypeRefAst>>> {
        self.cursor.expect(&TokenKind::Less, "'<'")?;
        let mut args = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::Star) {
                args.push(None);
            } else {
                args.push(Some(self.parse_type()?));
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::Greater, "'>'")?;
        Ok(args)
    }
}
