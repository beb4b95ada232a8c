//! Tests for the normalize module

use super::*;
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

/// Names of every element in document order
fn element_names(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) => {
                names.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    names
}

#[test]
fn test_account_records_lose_attributes() {
    let input = object(json!({
        "totalSize": 1,
        "done": true,
        "records": [{
            "attributes": {
                "type": "Account",
                "url": "/services/data/v52.0/sobjects/Account/001"
            },
            "Id": "001",
            "Name": "Acme"
        }]
    }));

    let doc = ResultNormalizer::new().normalize("Accounts", &input).unwrap();

    assert_eq!(
        doc.inner_xml(),
        "<recordsFound><totalSize>1</totalSize><done>true</done>\
         <records><Id>001</Id><Name>Acme</Name></records></recordsFound>"
    );
}

#[test]
fn test_attributes_removed_at_every_depth() {
    let input = object(json!({
        "attributes": {"type": "QueryResult"},
        "records": [
            {
                "attributes": {"type": "Contact"},
                "Id": "003",
                "Account": {
                    "attributes": {"type": "Account"},
                    "Name": "Acme",
                    "Owner": {"attributes": {"type": "User"}, "Alias": "jdoe"}
                }
            },
            {
                "attributes": {"type": "Contact"},
                "Id": "004",
                "Account": null
            }
        ]
    }));

    let doc = ResultNormalizer::new().normalize("Contacts", &input).unwrap();
    let names = element_names(doc.inner_xml());

    assert!(!names.iter().any(|n| n == "attributes"));
    assert_eq!(
        names,
        vec![
            "recordsFound",
            "records",
            "Id",
            "Account",
            "Name",
            "Owner",
            "Alias",
            "records",
            "Id",
            "Account"
        ]
    );
}

#[test]
fn test_field_order_preserved() {
    let input = object(json!({"Zeta": "z", "Alpha": "a", "Mid": "m"}));
    let doc = ResultNormalizer::new().normalize("T", &input).unwrap();
    assert_eq!(element_names(doc.inner_xml()), vec!["recordsFound", "Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_normalization_is_deterministic() {
    let input = object(json!({"records": [{"Id": "1", "Amount": 12.5, "Active": false}]}));
    let normalizer = ResultNormalizer::new();
    let first = normalizer.normalize("T", &input).unwrap();
    let second = normalizer.normalize("T", &input).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scalars_nulls_and_empty_values() {
    let input = object(json!({
        "count": 3,
        "ratio": 0.25,
        "flag": false,
        "missing": null,
        "blank": "",
        "none": [],
        "empty": {}
    }));

    let doc = ResultNormalizer::new().normalize("T", &input).unwrap();

    assert_eq!(
        doc.inner_xml(),
        "<recordsFound><count>3</count><ratio>0.25</ratio><flag>false</flag>\
         <missing/><blank></blank><empty/></recordsFound>"
    );
}

#[test]
fn test_text_is_escaped() {
    let input = object(json!({"Name": "Smith & Sons <Ltd>"}));
    let doc = ResultNormalizer::new().normalize("T", &input).unwrap();

    assert!(doc.inner_xml().contains("Smith &amp; Sons &lt;Ltd"));
    assert!(!doc.inner_xml().contains("<Ltd"));
}

#[test]
fn test_nested_arrays() {
    let input = object(json!({"matrix": [[1, 2], [3]]}));
    let doc = ResultNormalizer::new().normalize("T", &input).unwrap();

    assert_eq!(
        doc.inner_xml(),
        "<recordsFound><matrix><matrix>1</matrix><matrix>2</matrix></matrix>\
         <matrix><matrix>3</matrix></matrix></recordsFound>"
    );
}

#[test]
fn test_error_code_is_query_error() {
    let input = object(json!({
        "message": "sObject type 'Acount' is not supported.",
        "errorCode": "INVALID_TYPE"
    }));

    let err = ResultNormalizer::new().normalize("Accounts", &input).unwrap_err();
    match err {
        Error::QueryExecution {
            query,
            code,
            message,
        } => {
            assert_eq!(query, "Accounts");
            assert_eq!(code, "INVALID_TYPE");
            assert!(message.contains("not supported"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_custom_root() {
    let input = object(json!({"Id": "1"}));
    let doc = ResultNormalizer::with_root("result").normalize("T", &input).unwrap();
    assert_eq!(doc.into_inner_xml(), "<result><Id>1</Id></result>");
}

#[test]
fn test_encode_name() {
    assert_eq!(encode_name("Name").unwrap(), "Name");
    assert_eq!(encode_name("Custom_Field__c").unwrap(), "Custom_Field__c");
    assert_eq!(encode_name("Account Name").unwrap(), "Account_x0020_Name");
    assert_eq!(encode_name("3rdParty").unwrap(), "_x0033_rdParty");
    assert_eq!(encode_name("a-b.c").unwrap(), "a-b.c");
    assert_eq!(encode_name("@type").unwrap(), "_x0040_type");
    assert!(encode_name("").is_err());
}

#[test]
fn test_encoded_keys_produce_well_formed_xml() {
    let input = object(json!({"Account Name": "Acme", "1st": "x"}));
    let doc = ResultNormalizer::new().normalize("T", &input).unwrap();
    assert_eq!(
        element_names(doc.inner_xml()),
        vec!["recordsFound", "Account_x0020_Name", "_x0031_st"]
    );
}
