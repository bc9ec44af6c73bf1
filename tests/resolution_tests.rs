//! Method resolution through `#[subject]` tables and hand-built ones.

use nutest::Reflect;
use nutest::reflect::{ClassBuilder, Invocation, Invoker, MethodResolver, ResolutionError, Visibility};
use nutest::types::{self, PRIMITIVES, TypeDesc};
use nutest::value::{ToValue, Value};
use nutest::{Record, Tester, args, subject};

#[derive(Debug, Clone, PartialEq, Record)]
struct Inventory {
    items: Vec<String>,
}

#[subject(inspect)]
impl Inventory {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    fn restock(&self, amount: Option<i32>) -> i32 {
        amount.unwrap_or(10)
    }

    fn first_n(&self, n: i64, upper: bool) -> Vec<String> {
        self.items
            .iter()
            .take(n as usize)
            .map(|i| if upper { i.to_uppercase() } else { i.clone() })
            .collect()
    }

    fn test_count(&self, t: &mut Tester) {
        t.check_invoke(self, "count", &args![], self.items.len());
    }
}

fn inventory() -> Inventory {
    Inventory {
        items: vec!["apple".to_string(), "pear".to_string()],
    }
}

#[test]
fn test_subject_table_lists_reflectable_methods() {
    let info = Inventory::class_info();
    let signatures: Vec<String> = info.methods.iter().map(|m| m.signature().to_string()).collect();
    assert_eq!(
        signatures,
        vec![
            "count()",
            "contains(String)",
            "restock(Box<i32>)",
            "first_n(i64, bool)",
            "test_count(Tester)"
        ]
    );
    assert_eq!(info.methods[0].visibility, Visibility::Public);
    assert_eq!(info.methods[1].visibility, Visibility::Private);
}

#[test]
fn test_private_methods_resolve_and_run() {
    let mut t = Tester::new();
    let inv = inventory();
    assert!(t.check_invoke(&inv, "contains", &args!["pear"], true));
    assert!(t.check_invoke(&inv, "first_n", &args![1i64, true], vec!["APPLE"]));
}

#[test]
fn test_primitive_argument_reaches_boxed_parameter() {
    let mut t = Tester::new();
    let inv = inventory();
    assert!(t.check_invoke(&inv, "restock", &args![3], 3));
    assert!(t.check_invoke(&inv, "restock", &[Value::Null], 10));
}

#[test]
fn test_every_primitive_resolves_against_its_boxed_form() {
    struct Sink;

    for info in PRIMITIVES {
        let class = ClassBuilder::<Sink>::new("Sink")
            .method("take", vec![TypeDesc::Boxed(info.id)], Visibility::Private, |_, args| {
                Ok(args[0].clone())
            })
            .build();

        let handle = MethodResolver::resolve(&class, "take", &[TypeDesc::Primitive(info.id)]);
        assert!(handle.is_ok(), "{} should reach {}", info.canonical, info.boxed);

        let unrelated = MethodResolver::resolve(&class, "take", &[TypeDesc::named("String")]);
        assert!(matches!(unrelated, Err(ResolutionError::NoMatchingSignature { .. })));

        for other in PRIMITIVES.iter().filter(|o| o.id != info.id) {
            assert!(!types::compatible(&TypeDesc::Boxed(info.id), &TypeDesc::Primitive(other.id)));
        }
    }
}

#[test]
fn test_arity_mismatch_does_not_resolve() {
    let err = MethodResolver::resolve(Inventory::class_info(), "first_n", &[TypeDesc::parse("i64")]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "method `first_n` in the class Inventory has no signature matching first_n(i64)"
    );
}

#[test]
fn test_invoker_captures_decoding_faults() {
    let info = Inventory::class_info();
    let handle = MethodResolver::resolve(info, "contains", &[TypeDesc::Null]).unwrap();
    let Invocation::Faulted(fault) = Invoker::invoke(&handle, &inventory(), &[Value::Null]) else {
        panic!("null cannot decode into a String");
    };
    assert_eq!(fault.descriptor().kind_name, "IllegalArgument");
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Animal {
    name: String,
}

#[subject]
impl Animal {
    fn speak(&self) -> String {
        format!("{} makes a sound", self.name)
    }

    fn name_of(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Dog {
    animal: Animal,
}

#[subject(extends = Animal, via = animal)]
impl Dog {
    fn speak(&self) -> String {
        "woof".to_string()
    }
}

#[test]
fn test_ancestor_methods_resolve_after_own_methods() {
    let dog = Dog {
        animal: Animal { name: "Rex".to_string() },
    };
    let info = Dog::class_info();
    assert_eq!(info.ancestors, vec!["Animal"]);

    let mut t = Tester::new();
    assert!(t.check_invoke(&dog, "speak", &args![], "woof"));
    assert!(t.check_invoke(&dog, "name_of", &args![], "Rex"));
    assert_eq!(dog.to_value().field("animal").and_then(|a| a.field("name")), Some(&"Rex".to_value()));
}
