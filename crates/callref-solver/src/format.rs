//! Type formatting for messages and CLI output.

use crate::def::DefinitionStore;
use crate::intern::TypeInterner;
use crate::types::{ReflectionType, TypeArg, TypeData, TypeId};

/// Renders types the way they are written in source, with reflection
/// types spelled by arity: `KFunction2<Foo, Int, String>`, `KProperty0<Int>`.
pub struct TypeFormatter<'a> {
    types: &'a TypeInterner,
    defs: &'a DefinitionStore,
}

impl<'a> TypeFormatter<'a> {
    #[must_use]
    pub const fn new(types: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        Self { types, defs }
    }

    #[must_use]
    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(ty, &mut out);
        out
    }

    fn write_type(&self, ty: TypeId, out: &mut String) {
        let Some(data) = self.types.lookup(ty) else {
            out.push_str("<unknown>");
            return;
        };
        match data {
            TypeData::Error => out.push_str("<error>"),
            TypeData::Class {
                classifier,
                args,
                nullable,
            } => {
                let name = self
                    .defs
                    .classifier(classifier)
                    .map_or("<unknown>", |info| info.name.as_str());
                out.push_str(name);
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_arg(*arg, out);
                    }
                    out.push('>');
                }
                if nullable {
                    out.push('?');
                }
            }
            TypeData::TypeParameter { param, nullable } => {
                let name = self
                    .defs
                    .type_param(param)
                    .map_or("<unknown>", |info| info.name.as_str());
                out.push_str(name);
                if nullable {
                    out.push('?');
                }
            }
            TypeData::Reflection(reflection) => self.write_reflection(&reflection, out),
        }
    }

    fn write_arg(&self, arg: TypeArg, out: &mut String) {
        match arg {
            TypeArg::Star => out.push('*'),
            TypeArg::Projection { variance, ty } => {
                if let Some(keyword) = variance.keyword() {
                    out.push_str(keyword);
                    out.push(' ');
                }
                self.write_type(ty, out);
            }
        }
    }

    fn write_reflection(&self, reflection: &ReflectionType, out: &mut String) {
        let mut args: Vec<TypeId> = Vec::new();
        match reflection {
            ReflectionType::Class(arg) => {
                out.push_str("KClass<");
                self.write_arg(*arg, out);
                out.push('>');
                return;
            }
            ReflectionType::Function {
                receiver,
                params,
                return_type,
                is_suspend,
            } => {
                args.extend(receiver);
                args.extend(params.iter().map(|param| param.ty));
                let arity = args.len();
                args.push(*return_type);
                let prefix = if *is_suspend {
                    "KSuspendFunction"
                } else {
                    "KFunction"
                };
                out.push_str(&format!("{prefix}{arity}"));
            }
            ReflectionType::Property {
                receiver,
                value,
                mutable,
            } => {
                args.extend(receiver);
                let arity = args.len();
                args.push(*value);
                let prefix = if *mutable {
                    "KMutableProperty"
                } else {
                    "KProperty"
                };
                out.push_str(&format!("{prefix}{arity}"));
            }
        }
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(*arg, out);
        }
        out.push('>');
    }
}
