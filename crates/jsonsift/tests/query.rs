#![allow(missing_docs)]

use jsonsift::{
    Arity, CompiledQuery, Document, Item, QueryError, Value, compile, evaluate, jsonpath, parse,
    parse_safe, register_function,
};
use rstest::rstest;

const STORE: &str = r#"
{ "store": {
    "book": [
      { "category": "reference",
        "author": "Nigel Rees",
        "title": "Sayings of the Century",
        "price": 8.95
      },
      { "category": "fiction",
        "author": "Evelyn Waugh",
        "title": "Sword of Honour",
        "price": 12.99
      },
      { "category": "fiction",
        "author": "Herman Melville",
        "title": "Moby Dick",
        "isbn": "0-553-21311-3",
        "price": 8.99
      },
      { "category": "fiction",
        "author": "J. R. R. Tolkien",
        "title": "The Lord of the Rings",
        "isbn": "0-395-19395-8",
        "price": 22.99
      }
    ],
    "bicycle": {
      "color": "red",
      "price": 19.95
    }
  }
}
"#;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn values(doc: &Document<'_>, query: &str) -> Vec<Value> {
    compile(query)
        .unwrap()
        .evaluate(doc.root())
        .unwrap()
        .iter()
        .map(|item| item.value().unwrap())
        .collect()
}

fn paths(doc: &Document<'_>, query: &str) -> Vec<String> {
    compile(query)
        .unwrap()
        .evaluate(doc.root())
        .unwrap()
        .iter()
        .map(|item| match item {
            Item::Node(node) => node.path(),
            Item::Detached(_) => panic!("{query}: detached result"),
        })
        .collect()
}

#[rstest]
#[case("$.store.book[*].author", &["$['store']['book'][0]['author']", "$['store']['book'][1]['author']", "$['store']['book'][2]['author']", "$['store']['book'][3]['author']"])]
#[case("$..author", &["$['store']['book'][0]['author']", "$['store']['book'][1]['author']", "$['store']['book'][2]['author']", "$['store']['book'][3]['author']"])]
#[case("$.store.*", &["$['store']['book']", "$['store']['bicycle']"])]
#[case("$..book[2]", &["$['store']['book'][2]"])]
#[case("$..book[-1:]", &["$['store']['book'][3]"])]
#[case("$..book[0,1]", &["$['store']['book'][0]", "$['store']['book'][1]"])]
#[case("$..book[:2]", &["$['store']['book'][0]", "$['store']['book'][1]"])]
#[case("$..book[?(@.isbn)]", &["$['store']['book'][2]", "$['store']['book'][3]"])]
#[case("$..book[?(@.price<10)]", &["$['store']['book'][0]", "$['store']['book'][2]"])]
#[case("$..book[(size(@) - 1)]", &["$['store']['book'][3]"])]
#[case("$.store['bicycle'].color", &["$['store']['bicycle']['color']"])]
#[case("$.store.nothing.here", &[])]
fn store_paths(#[case] query: &str, #[case] expected: &[&str]) {
    init();
    let doc = parse(STORE.as_bytes()).unwrap();
    assert_eq!(paths(&doc, query), expected);
}

#[test]
fn store_prices_in_document_order() {
    let doc = parse(STORE.as_bytes()).unwrap();
    assert_eq!(
        values(&doc, "$.store..price"),
        [8.95, 12.99, 8.99, 22.99, 19.95].map(Value::from)
    );
}

#[test]
fn filters_combine_conditions() {
    let doc = parse(STORE.as_bytes()).unwrap();
    assert_eq!(
        values(
            &doc,
            "$.store.book[?(@.price > 10 && @.category == 'fiction')].title"
        ),
        [Value::from("Sword of Honour"), Value::from("The Lord of the Rings")]
    );
    assert_eq!(
        values(&doc, "$.store.book[?(@.author == 'Herman Melville')].title"),
        [Value::from("Moby Dick")]
    );
    assert_eq!(
        values(&doc, "$.store.book[?(!@.isbn || @.price < 9)].price"),
        [8.95, 12.99, 8.99].map(Value::from)
    );
}

#[test]
fn expressions_yield_detached_values() {
    let doc = parse(STORE.as_bytes()).unwrap();
    let query = compile("avg($..price)").unwrap();
    let items = query.evaluate(doc.root()).unwrap();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Item::Detached(_)));
    let avg = items[0].node().must_numeric();
    assert!((avg - 14.774).abs() < 1e-9, "{avg}");

    assert_eq!(values(&doc, "length($.store.book)"), [Value::from(4)]);
    assert_eq!(values(&doc, "max($..book[*].price) - min($..price)"), [Value::from(22.99 - 8.95)]);
    assert_eq!(values(&doc, "upper($.store.bicycle.color)"), [Value::from("RED")]);
    assert_eq!(values(&doc, "'literal'"), [Value::from("literal")]);
}

#[test]
fn context_node_is_dollar() {
    let doc = parse(STORE.as_bytes()).unwrap();
    let bicycle = doc.root().get("store").and_then(|s| s.get("bicycle")).unwrap();
    let found = evaluate(&compile("$.color").unwrap(), bicycle).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].node().path(), "$['store']['bicycle']['color']");
}

#[test]
fn evaluation_errors() {
    let doc = parse(STORE.as_bytes()).unwrap();
    let eval = |q: &str| compile(q).unwrap().evaluate(doc.root()).map(|_| ());
    assert_eq!(
        eval("avg($.store.nothing)"),
        Err(QueryError::EmptyInput {
            function: "avg".into()
        })
    );
    assert!(matches!(
        eval("pow(2)"),
        Err(QueryError::Arity { found: 1, .. })
    ));
    assert!(matches!(
        eval("abs($.store.bicycle.color)"),
        Err(QueryError::ArgumentType { position: 0, .. })
    ));
    assert_eq!(eval("$.store.book[(1 / 0)]"), Err(QueryError::DivisionByZero));
}

#[test]
fn compile_errors() {
    assert!(matches!(
        compile("$.store.book[?(@.price <)]"),
        Err(QueryError::Syntax { .. })
    ));
    assert_eq!(
        compile("nosuchfunction($)").err(),
        Some(QueryError::UnknownFunction {
            name: "nosuchfunction".into()
        })
    );
    assert!("$..[".parse::<CompiledQuery>().is_err());
}

#[test]
fn compile_is_idempotent() {
    let doc = parse(STORE.as_bytes()).unwrap();
    for query in ["$..book[?(@.price<10)].title", "$..*", "sum($..price)", "$.store.book[::-1]"] {
        let a = compile(query).unwrap();
        let b = compile(query).unwrap();
        assert_eq!(a.to_string(), b.to_string());
        let left: Vec<_> = a.evaluate(doc.root()).unwrap().iter().map(|i| i.value().unwrap()).collect();
        let right: Vec<_> = b.evaluate(doc.root()).unwrap().iter().map(|i| i.value().unwrap()).collect();
        assert_eq!(left, right, "{query}");
    }
}

#[test]
fn token_renderings() {
    let render = |q: &str| compile(q).unwrap().to_string();
    insta::assert_snapshot!(render("$..book[?(@.price<10)].title"), @"Path($, ..['book'][?(Operator(<, Path(@, ['price']), Literal(10)))]['title'])");
    insta::assert_snapshot!(render("avg($..price)"), @"Function(avg, Arguments(Path($, ..['price'])))");
    insta::assert_snapshot!(render("$['a','b'][1:-1:2]"), @"Path($, ['a','b'][1:-1:2])");
    insta::assert_snapshot!(render("-(1 + 2) * 3"), @"Operator(*, Operator(-, Operator(+, Literal(1), Literal(2)), <nil>), Literal(3))");
    insta::assert_snapshot!(render("CONCAT('a', \"b\", NULL)"), @r#"Function(concat, Arguments(Literal("a"), Literal("b"), Literal(null)))"#);
}

#[test]
fn registered_functions_bind_at_compile_time() {
    register_function("tag_v1", Arity::Exactly(1), |_, args| {
        Ok(Value::from(format!("v1:{}", args[0].as_string()?)))
    });
    let query = compile("TAG_V1($.name)").unwrap();
    assert_eq!(jsonpath(br#"{"name":"x"}"#, "tag_v1($.name)").unwrap(), [Value::from("v1:x")]);

    register_function("tag_v1", Arity::Exactly(1), |_, _| Ok(Value::from("replaced")));
    let doc = parse(br#"{"name":"x"}"#).unwrap();
    // the compiled query keeps the definition it was bound to
    assert_eq!(values_of(&query, &doc), [Value::from("v1:x")]);
    assert_eq!(values(&doc, "tag_v1($.name)"), [Value::from("replaced")]);
}

#[test]
fn functions_receive_the_context_node() {
    register_function("context_size", Arity::Between(0, 1), |ctx, _| {
        #[allow(clippy::cast_precision_loss)]
        Ok(Value::from(ctx.size() as f64))
    });
    let doc = parse(b"[[1,2],[3]]").unwrap();
    assert_eq!(values(&doc, "$[?(context_size() == 2)]").len(), 1);
    assert_eq!(values(&doc, "context_size()"), [Value::from(2)]);
}

fn values_of(query: &CompiledQuery, doc: &Document<'_>) -> Vec<Value> {
    query
        .evaluate(doc.root())
        .unwrap()
        .iter()
        .map(|item| item.value().unwrap())
        .collect()
}

#[test]
fn queries_see_mutations() {
    let mut doc = parse_safe(STORE.as_bytes()).unwrap();
    let price = compile("$.store.bicycle.price").unwrap();
    assert_eq!(values_of(&price, &doc), [Value::from(19.95)]);

    let mut store = doc.root_mut();
    let mut store = store.get_mut("store").unwrap();
    store
        .get_mut("bicycle")
        .unwrap()
        .set("price", &Value::from(5))
        .unwrap();
    store.get_mut("book").unwrap().remove_at(0).unwrap();

    assert_eq!(values_of(&price, &doc), [Value::from(5)]);
    assert_eq!(values(&doc, "size($.store.book)"), [Value::from(3)]);
    assert_eq!(
        values(&doc, "$.store.book[0].author"),
        [Value::from("Evelyn Waugh")]
    );
}

#[test]
fn shared_across_threads() {
    let doc = parse(STORE.as_bytes()).unwrap();
    let query = compile("$..book[?(@.price > 10)].title").unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let titles = values_of(&query, &doc);
                assert_eq!(titles.len(), 2);
            });
        }
    });
}
