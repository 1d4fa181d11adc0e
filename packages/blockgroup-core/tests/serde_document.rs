#[cfg(feature = "serde")]
#[test]
fn host_documents_load_from_json() {
    use blockgroup_core::{Document, GroupId, Node};

    let json = r#"{
        "content": [
            {"type": "attachmentGroup", "id": "group-7", "children": [
                {"type": "attachmentBlock", "subtype": "CHATGPT", "content": "A"},
                {"type": "attachmentBlock", "subtype": "CHATGPT", "content": "B",
                 "attrs": {"title": "second"}}
            ]},
            {"type": "block", "name": "paragraph", "text": "hi"}
        ]
    }"#;
    let doc: Document = serde_json::from_str(json).expect("deserialize Document");
    assert_eq!(doc.version(), 0);
    assert_eq!(doc.size(), 8);
    assert_eq!(doc.group_ids(), vec![&GroupId::new("group-7")]);
    let Some(Node::Group(group)) = doc.content().first() else {
        panic!("expected a group first, got {:?}", doc.content());
    };
    assert_eq!(group.children[1].attrs().get("title").map(String::as_str), Some("second"));

    let out = serde_json::to_string(&doc).expect("serialize Document");
    assert!(
        out.contains(r#""type":"attachmentGroup""#) && out.contains(r#""id":"group-7""#),
        "unexpected document JSON: {out}"
    );
    let roundtrip: Document = serde_json::from_str(&out).expect("reparse Document");
    assert_eq!(roundtrip, doc);
}

#[cfg(feature = "serde")]
#[test]
fn commands_and_policy_use_camel_case_json() {
    use blockgroup_core::{Command, GroupingPolicy};

    let command: Command =
        serde_json::from_str(r#"{"command": "groupBlocks", "args": [1, 4]}"#).expect("command");
    assert_eq!(command, Command::GroupBlocks(vec![1, 4]));
    let moved: Command =
        serde_json::from_str(r#"{"command": "moveBlock", "args": {"from": 2, "to": 0}}"#)
            .expect("move command");
    assert_eq!(moved, Command::MoveBlock { from: 2, to: 0 });
    let repair: Command = serde_json::from_str(r#"{"command": "repair"}"#).expect("repair");
    assert_eq!(repair, Command::Repair);

    let policy = GroupingPolicy::from_json(r#"{"maxSelection": 6}"#).expect("policy");
    assert_eq!(policy.max_selection, 6);
    assert_eq!(policy.eligible_subtype, "CHATGPT");
    assert!(GroupingPolicy::from_json("[]").is_err());
}
