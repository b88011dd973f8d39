//! Structural type data.
//!
//! Types are interned by the [`TypeInterner`](crate::intern::TypeInterner);
//! everything outside the interner works with [`TypeId`] handles. Two types
//! are equal exactly when their ids are equal.

use crate::def::{ClassifierId, TypeParamId};
use smallvec::SmallVec;

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The error type. Any type built from an error part is itself an error.
    pub const ERROR: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const NULLABLE_ANY: TypeId = TypeId(2);
    pub const NOTHING: TypeId = TypeId(3);
    pub const NULLABLE_NOTHING: TypeId = TypeId(4);
    pub const UNIT: TypeId = TypeId(5);
    pub const INT: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);

    /// Number of ids pre-interned by `TypeInterner::new`.
    pub(crate) const FIRST_USER: u32 = 9;

    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Out,
    In,
}

impl Variance {
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Variance::Invariant => None,
            Variance::Out => Some("out"),
            Variance::In => Some("in"),
        }
    }
}

/// A type argument: `*` or a (possibly variance-projected) type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Star,
    Projection { variance: Variance, ty: TypeId },
}

impl TypeArg {
    #[must_use]
    pub const fn invariant(ty: TypeId) -> TypeArg {
        TypeArg::Projection {
            variance: Variance::Invariant,
            ty,
        }
    }

    #[must_use]
    pub const fn out(ty: TypeId) -> TypeArg {
        TypeArg::Projection {
            variance: Variance::Out,
            ty,
        }
    }

    #[must_use]
    pub const fn ty(self) -> Option<TypeId> {
        match self {
            TypeArg::Star => None,
            TypeArg::Projection { ty, .. } => Some(ty),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReflectionParam {
    pub name: String,
    pub ty: TypeId,
}

/// Types of reflective values produced by `::` expressions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReflectionType {
    /// `KClass<T>`
    Class(TypeArg),
    /// `KFunctionN<[Receiver,] P1, ..., R>`
    Function {
        receiver: Option<TypeId>,
        params: Vec<ReflectionParam>,
        return_type: TypeId,
        is_suspend: bool,
    },
    /// `KProperty0<V>`, `KMutableProperty1<R, V>`, ...
    Property {
        receiver: Option<TypeId>,
        value: TypeId,
        mutable: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Error,
    Class {
        classifier: ClassifierId,
        args: SmallVec<[TypeArg; 2]>,
        nullable: bool,
    },
    TypeParameter {
        param: TypeParamId,
        nullable: bool,
    },
    Reflection(ReflectionType),
}

impl TypeData {
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        match self {
            TypeData::Class { nullable, .. } | TypeData::TypeParameter { nullable, .. } => *nullable,
            TypeData::Error | TypeData::Reflection(_) => false,
        }
    }

    #[must_use]
    pub const fn classifier(&self) -> Option<ClassifierId> {
        match self {
            TypeData::Class { classifier, .. } => Some(*classifier),
            _ => None,
        }
    }
}

/// A mapping from type parameters to the types that replace them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Substitution(SmallVec<[(TypeParamId, TypeId); 2]>);

impl Substitution {
    #[must_use]
    pub fn new() -> Substitution {
        Substitution::default()
    }

    /// Later insertions for the same parameter replace earlier ones.
    pub fn insert(&mut self, param: TypeParamId, ty: TypeId) {
        if let Some(entry) = self.0.iter_mut().find(|(p, _)| *p == param) {
            entry.1 = ty;
        } else {
            self.0.push((param, ty));
        }
    }

    #[must_use]
    pub fn get(&self, param: TypeParamId) -> Option<TypeId> {
        self.0.iter().find(|(p, _)| *p == param).map(|(_, ty)| *ty)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeParamId, TypeId)> + '_ {
        self.0.iter().copied()
    }
}
