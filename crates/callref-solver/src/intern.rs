//! Type interning.
//!
//! The interner hands out [`TypeId`]s for structurally equal [`TypeData`]
//! values and is shared by reference across one resolution run. Interning
//! takes `&self`; resolution is single-threaded so a `RefCell` guards the
//! tables.

use crate::def::{ClassifierId, TypeParamId};
use crate::types::{ReflectionParam, ReflectionType, Substitution, TypeArg, TypeData, TypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;

#[derive(Debug, Default)]
struct InternerTables {
    types: Vec<TypeData>,
    ids: FxHashMap<TypeData, TypeId>,
}

#[derive(Debug)]
pub struct TypeInterner {
    tables: RefCell<InternerTables>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create an interner with the well-known [`TypeId`] constants
    /// pre-registered.
    #[must_use]
    pub fn new() -> TypeInterner {
        let interner = TypeInterner {
            tables: RefCell::new(InternerTables::default()),
        };
        let simple = |classifier, nullable| TypeData::Class {
            classifier,
            args: SmallVec::new(),
            nullable,
        };
        let well_known = [
            (TypeId::ERROR, TypeData::Error),
            (TypeId::ANY, simple(ClassifierId::ANY, false)),
            (TypeId::NULLABLE_ANY, simple(ClassifierId::ANY, true)),
            (TypeId::NOTHING, simple(ClassifierId::NOTHING, false)),
            (TypeId::NULLABLE_NOTHING, simple(ClassifierId::NOTHING, true)),
            (TypeId::UNIT, simple(ClassifierId::UNIT, false)),
            (TypeId::INT, simple(ClassifierId::INT, false)),
            (TypeId::STRING, simple(ClassifierId::STRING, false)),
            (TypeId::BOOLEAN, simple(ClassifierId::BOOLEAN, false)),
        ];
        for (expected, data) in well_known {
            let id = interner.intern(data);
            debug_assert_eq!(id, expected);
        }
        debug_assert_eq!(interner.len() as u32, TypeId::FIRST_USER);
        interner
    }

    pub fn intern(&self, data: TypeData) -> TypeId {
        let mut tables = self.tables.borrow_mut();
        if let Some(&id) = tables.ids.get(&data) {
            return id;
        }
        let id = TypeId(tables.types.len() as u32);
        tables.types.push(data.clone());
        tables.ids.insert(data, id);
        id
    }

    #[must_use]
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.tables.borrow().types.get(id.0 as usize).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.borrow().types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn class_type(
        &self,
        classifier: ClassifierId,
        args: impl IntoIterator<Item = TypeArg>,
        nullable: bool,
    ) -> TypeId {
        let args: SmallVec<[TypeArg; 2]> = args.into_iter().collect();
        if args.iter().any(|arg| arg.ty().is_some_and(TypeId::is_error)) {
            return TypeId::ERROR;
        }
        self.intern(TypeData::Class {
            classifier,
            args,
            nullable,
        })
    }

    pub fn type_param(&self, param: TypeParamId, nullable: bool) -> TypeId {
        self.intern(TypeData::TypeParameter { param, nullable })
    }

    pub fn kclass(&self, arg: TypeArg) -> TypeId {
        if arg.ty().is_some_and(TypeId::is_error) {
            return TypeId::ERROR;
        }
        self.intern(TypeData::Reflection(ReflectionType::Class(arg)))
    }

    /// `KFunction` type; an error in any part makes the whole type an error.
    pub fn kfunction(
        &self,
        receiver: Option<TypeId>,
        params: Vec<ReflectionParam>,
        return_type: TypeId,
        is_suspend: bool,
    ) -> TypeId {
        let has_error = receiver.is_some_and(TypeId::is_error)
            || return_type.is_error()
            || params.iter().any(|param| param.ty.is_error());
        if has_error {
            return TypeId::ERROR;
        }
        self.intern(TypeData::Reflection(ReflectionType::Function {
            receiver,
            params,
            return_type,
            is_suspend,
        }))
    }

    pub fn kproperty(&self, receiver: Option<TypeId>, value: TypeId, mutable: bool) -> TypeId {
        if value.is_error() || receiver.is_some_and(TypeId::is_error) {
            return TypeId::ERROR;
        }
        self.intern(TypeData::Reflection(ReflectionType::Property {
            receiver,
            value,
            mutable,
        }))
    }

    // =========================================================================
    // Queries and transforms
    // =========================================================================

    #[must_use]
    pub fn is_nullable(&self, ty: TypeId) -> bool {
        self.lookup(ty).is_some_and(|data| data.is_nullable())
    }

    #[must_use]
    pub fn classifier_of(&self, ty: TypeId) -> Option<ClassifierId> {
        self.lookup(ty).and_then(|data| data.classifier())
    }

    pub fn make_nullable(&self, ty: TypeId) -> TypeId {
        self.with_nullability(ty, true)
    }

    pub fn make_non_null(&self, ty: TypeId) -> TypeId {
        self.with_nullability(ty, false)
    }

    fn with_nullability(&self, ty: TypeId, nullable: bool) -> TypeId {
        match self.lookup(ty) {
            Some(TypeData::Class {
                classifier, args, ..
            }) => self.intern(TypeData::Class {
                classifier,
                args,
                nullable,
            }),
            Some(TypeData::TypeParameter { param, .. }) => {
                self.intern(TypeData::TypeParameter { param, nullable })
            }
            _ => ty,
        }
    }

    /// Replace type parameters according to `subst`. Nullability of a
    /// replaced `T?` is added to the replacement.
    pub fn substitute(&self, ty: TypeId, subst: &Substitution) -> TypeId {
        if subst.is_empty() {
            return ty;
        }
        let Some(data) = self.lookup(ty) else {
            return ty;
        };
        match data {
            TypeData::Error => ty,
            TypeData::TypeParameter { param, nullable } => match subst.get(param) {
                Some(replacement) if nullable => self.make_nullable(replacement),
                Some(replacement) => replacement,
                None => ty,
            },
            TypeData::Class {
                classifier,
                args,
                nullable,
            } => {
                let args: Vec<TypeArg> = args
                    .into_iter()
                    .map(|arg| self.substitute_arg(arg, subst))
                    .collect();
                self.class_type(classifier, args, nullable)
            }
            TypeData::Reflection(reflection) => match reflection {
                ReflectionType::Class(arg) => self.kclass(self.substitute_arg(arg, subst)),
                ReflectionType::Function {
                    receiver,
                    params,
                    return_type,
                    is_suspend,
                } => {
                    let params = params
                        .into_iter()
                        .map(|param| ReflectionParam {
                            ty: self.substitute(param.ty, subst),
                            name: param.name,
                        })
                        .collect();
                    self.kfunction(
                        receiver.map(|r| self.substitute(r, subst)),
                        params,
                        self.substitute(return_type, subst),
                        is_suspend,
                    )
                }
                ReflectionType::Property {
                    receiver,
                    value,
                    mutable,
                } => self.kproperty(
                    receiver.map(|r| self.substitute(r, subst)),
                    self.substitute(value, subst),
                    mutable,
                ),
            },
        }
    }

    fn substitute_arg(&self, arg: TypeArg, subst: &Substitution) -> TypeArg {
        match arg {
            TypeArg::Star => TypeArg::Star,
            TypeArg::Projection { variance, ty } => TypeArg::Projection {
                variance,
                ty: self.substitute(ty, subst),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ids_are_preinterned() {
        let types = TypeInterner::new();
        assert_eq!(types.lookup(TypeId::ERROR), Some(TypeData::Error));
        assert_eq!(types.classifier_of(TypeId::STRING), Some(ClassifierId::STRING));
        assert!(types.is_nullable(TypeId::NULLABLE_ANY));
        assert_eq!(types.make_nullable(TypeId::NOTHING), TypeId::NULLABLE_NOTHING);
    }

    #[test]
    fn error_arguments_poison_the_type() {
        let types = TypeInterner::new();
        let list = types.class_type(ClassifierId::ARRAY, [TypeArg::invariant(TypeId::ERROR)], false);
        assert_eq!(list, TypeId::ERROR);
        let func = types.kfunction(None, Vec::new(), TypeId::ERROR, false);
        assert_eq!(func, TypeId::ERROR);
    }

    #[test]
    fn substitution_keeps_nullability_of_the_use_site() {
        let types = TypeInterner::new();
        let t = TypeParamId(0);
        let nullable_t = types.type_param(t, true);
        let mut subst = Substitution::new();
        subst.insert(t, TypeId::INT);
        let result = types.substitute(nullable_t, &subst);
        assert!(types.is_nullable(result));
        assert_eq!(types.make_non_null(result), TypeId::INT);
    }
}
