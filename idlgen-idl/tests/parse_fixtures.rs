use idlgen_idl::namespace::NamespaceTable;
use idlgen_idl::parse::{parse_ast_file, parse_ast_files};
use idlgen_idl::types::{FieldType, Statement, StatementKind};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_parse_user_service() {
    let files = parse_ast_file(fixture_path("user_service.ast.json"))
        .expect("should parse user_service.ast.json");
    assert_eq!(files.len(), 3, "fixture should have 3 files");

    let user = &files[0];
    assert!(user.is_entry);
    assert_eq!(user.statements.len(), 7, "user.thrift should have 7 statements");
    assert_eq!(user.services().count(), 1);

    let service = user.services().next().unwrap();
    assert_eq!(service.functions.len(), 2);
    assert_eq!(
        service.functions[0].request_type(),
        Some(&FieldType::Identifier("GetUserRequest".to_string()))
    );
}

#[test]
fn test_cross_file_reference_resolves() {
    let files = parse_ast_file(fixture_path("user_service.ast.json")).unwrap();
    let table = NamespaceTable::build(&files);

    let (resolved, statement) = table
        .lookup(&files, 0, "base.BaseInfo")
        .expect("base.BaseInfo should resolve from user.thrift");
    assert_eq!(resolved.id.file, 1);
    assert_eq!(statement.kind(), StatementKind::Struct);

    assert!(
        table.resolve(&files, 0, "other.Lonely").is_err(),
        "other.thrift is not included by user.thrift"
    );
}

#[test]
fn test_merge_keeps_first_copy_and_entry_flag() {
    let files = parse_ast_files(&[
        fixture_path("user_service.ast.json"),
        fixture_path("base_only.ast.json"),
    ])
    .expect("should merge both dumps");

    assert_eq!(files.len(), 3, "base.thrift must not be duplicated");
    let base = files
        .iter()
        .find(|f| f.idl_path == "/idl/base/base.thrift")
        .unwrap();
    assert!(base.is_entry, "entry flag from the second dump should win");
    assert_eq!(base.statements.len(), 3, "first copy is kept");
    assert!(matches!(base.statements[2], Statement::ConstDefinition(_)));
}
