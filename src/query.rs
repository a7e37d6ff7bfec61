//! Request → reply dispatch for an external query boundary.
//!
//! No framing or transport lives here: a service decodes its wire format into
//! a [`Request`], calls [`respond`], and encodes the [`Reply`].

use crate::{Backend, EchtError, EchtResult, Name, Removal, Value, ValueSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub name: Name,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(Vec<Value>),
    Set(Vec<Value>),
    Get,
    Lpm,
    /// `None` clears every value.
    Remove(Option<Vec<Value>>),
    IsEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Values stored under `name`. For LPM, `name` is the matched prefix.
    Values { name: Name, values: ValueSet },
    Entry(bool),
    NotFound,
}

impl Request {
    pub fn new(name: Name, operation: Operation) -> Self {
        Self { name, operation }
    }

    pub fn get(name: Name) -> Self {
        Self::new(name, Operation::Get)
    }

    pub fn lpm(name: Name) -> Self {
        Self::new(name, Operation::Lpm)
    }

    pub fn add(name: Name, values: Vec<Value>) -> Self {
        Self::new(name, Operation::Add(values))
    }

    /// Whether answering needs exclusive access to the backend.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self.operation,
            Operation::Add(_) | Operation::Set(_) | Operation::Remove(_)
        )
    }
}

impl Reply {
    fn values(name: Name, values: Option<&ValueSet>) -> Reply {
        match values {
            Some(values) => Reply::Values {
                name,
                values: values.clone(),
            },
            None => Reply::NotFound,
        }
    }
}

/// Apply `request` to `backend`.
///
/// Read-only operations never touch the backend mutably, but taking `&mut`
/// keeps one entry point; [`answer`] serves them from a shared reference.
pub fn respond(backend: &mut dyn Backend, request: Request) -> EchtResult<Reply> {
    let Request { name, operation } = request;
    match operation {
        Operation::Add(values) => {
            backend.add(&name, &values);
            Ok(Reply::values(name.clone(), backend.get(&name)))
        }
        Operation::Set(values) => {
            backend.set(&name, &values);
            Ok(Reply::values(name.clone(), backend.get(&name)))
        }
        Operation::Remove(targets) => {
            let removal = match &targets {
                Some(values) => Removal::Values(values),
                None => Removal::All,
            };
            let remaining = backend.remove(&name, removal)?;
            Ok(Reply::values(name, remaining))
        }
        read => answer(backend, Request::new(name, read)),
    }
}

/// Serve a read-only request.
///
/// Mutations fail with [`EchtError::Unsupported`]; they need [`respond`].
pub fn answer(backend: &dyn Backend, request: Request) -> EchtResult<Reply> {
    let Request { name, operation } = request;
    let reply = match operation {
        Operation::Get => Reply::values(name.clone(), backend.get(&name)),
        Operation::Lpm => match backend.longest_prefix_match(&name) {
            Some(hit) => Reply::Values {
                name: hit.prefix,
                values: hit.values.clone(),
            },
            None => Reply::NotFound,
        },
        Operation::IsEntry => Reply::Entry(backend.is_entry(&name)),
        Operation::Add(_) => return Err(read_only(backend, "add")),
        Operation::Set(_) => return Err(read_only(backend, "set")),
        Operation::Remove(_) => return Err(read_only(backend, "remove")),
    };
    Ok(reply)
}

fn read_only(backend: &dyn Backend, operation: &'static str) -> EchtError {
    EchtError::Unsupported {
        backend: backend.kind(),
        operation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackendKind, Config};

    fn name(uri: &str) -> Name {
        Name::parse(uri).unwrap()
    }

    fn values(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    fn set(items: &[&str]) -> ValueSet {
        values(items).into_iter().collect()
    }

    #[test]
    fn test_round() {
        for kind in BackendKind::ALL {
            let mut b = kind.build(&Config::default());
            let b = b.as_mut();

            let reply = respond(b, Request::add(name("/om/edu"), values(&["AS1"]))).unwrap();
            assert_eq!(
                reply,
                Reply::Values {
                    name: name("/om/edu"),
                    values: set(&["AS1"]),
                }
            );
            let reply = respond(b, Request::add(name("/om/edu"), values(&["AS2"]))).unwrap();
            assert_eq!(
                reply,
                Reply::Values {
                    name: name("/om/edu"),
                    values: set(&["AS1", "AS2"]),
                }
            );

            let reply = respond(b, Request::lpm(name("/om/edu/squ"))).unwrap();
            assert_eq!(
                reply,
                Reply::Values {
                    name: name("/om/edu"),
                    values: set(&["AS1", "AS2"]),
                }
            );

            assert_eq!(respond(b, Request::get(name("/om"))).unwrap(), Reply::NotFound);
            assert_eq!(
                respond(b, Request::new(name("/om"), Operation::IsEntry)).unwrap(),
                Reply::Entry(false)
            );

            let reply = respond(
                b,
                Request::new(name("/om/edu"), Operation::Set(values(&["AS9"]))),
            )
            .unwrap();
            assert_eq!(
                reply,
                Reply::Values {
                    name: name("/om/edu"),
                    values: set(&["AS9"]),
                }
            );
        }
    }

    #[test]
    fn test_remove() {
        let mut b = BackendKind::Named.build(&Config::default());
        let b = b.as_mut();
        respond(b, Request::add(name("/a"), values(&["x", "y"]))).unwrap();

        let reply = respond(
            b,
            Request::new(name("/a"), Operation::Remove(Some(values(&["x"])))),
        )
        .unwrap();
        assert_eq!(
            reply,
            Reply::Values {
                name: name("/a"),
                values: set(&["y"]),
            }
        );

        let err = respond(
            b,
            Request::new(name("/a"), Operation::Remove(Some(values(&["x"])))),
        )
        .unwrap_err();
        assert!(matches!(err, EchtError::ValueNotPresent { .. }));

        let reply = respond(b, Request::new(name("/a"), Operation::Remove(None))).unwrap();
        assert_eq!(
            reply,
            Reply::Values {
                name: name("/a"),
                values: ValueSet::new(),
            }
        );
        assert_eq!(
            respond(b, Request::new(name("/b"), Operation::Remove(None))).unwrap(),
            Reply::NotFound
        );
    }

    #[test]
    fn test_answer_rejects_mutation() {
        let b = BackendKind::Text.build(&Config::default());
        let cases = [
            (Request::add(name("/a"), values(&["x"])), "add"),
            (Request::new(name("/a"), Operation::Set(values(&["x"]))), "set"),
            (Request::new(name("/a"), Operation::Remove(None)), "remove"),
        ];
        for (request, operation) in cases {
            assert!(request.is_mutation());
            assert_eq!(
                answer(b.as_ref(), request),
                Err(EchtError::Unsupported {
                    backend: BackendKind::Text,
                    operation,
                })
            );
        }
        assert!(b.is_empty());
        assert_eq!(b.stats().processed_entries, 0);

        assert_eq!(answer(b.as_ref(), Request::get(name("/a"))), Ok(Reply::NotFound));
    }
}
