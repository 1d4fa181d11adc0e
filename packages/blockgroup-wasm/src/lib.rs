#![forbid(unsafe_code)]
//! WASM-friendly bridge for the block-grouping editor.
//! The JS host owns the DOM event loop: it forwards pointer events as resolved document
//! positions and performs its default move whenever a drop comes back unhandled.

use blockgroup_core::{Command, Document, DropOutcome, Editor, Fallback, GroupingPolicy, Side};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct JsDropOutcome {
    handled: bool,
    group: Option<String>,
    created: bool,
    /// Why the drop fell through to the default move.
    fallback: Option<&'static str>,
}

impl From<DropOutcome> for JsDropOutcome {
    fn from(outcome: DropOutcome) -> Self {
        match outcome {
            DropOutcome::Grouped { group, created } => JsDropOutcome {
                handled: true,
                group: Some(group.to_string()),
                created,
                fallback: None,
            },
            DropOutcome::Fallback(reason) => JsDropOutcome {
                handled: false,
                group: None,
                created: false,
                fallback: Some(match reason {
                    Fallback::NoSession => "noSession",
                    Fallback::Unresolved => "unresolved",
                    Fallback::NoGroupingTarget => "noGroupingTarget",
                    Fallback::Stale => "stale",
                    Fallback::Failed(_) => "failed",
                }),
            },
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct JsHighlight {
    pos: usize,
    side: &'static str,
    group: Option<usize>,
}

fn parse_document(doc_json: &str) -> Result<Document, String> {
    serde_json::from_str(doc_json).map_err(|e| e.to_string())
}

fn parse_policy(policy_json: Option<String>) -> Result<GroupingPolicy, String> {
    match policy_json.as_deref() {
        Some(json) if !json.trim().is_empty() => {
            GroupingPolicy::from_json(json).map_err(|e| e.to_string())
        }
        _ => Ok(GroupingPolicy::default()),
    }
}

fn js_err(err: impl ToString) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmEditor {
    inner: Editor,
}

impl WasmEditor {
    fn from_json(doc_json: &str, policy_json: Option<String>) -> Result<WasmEditor, String> {
        let doc = parse_document(doc_json)?;
        let policy = parse_policy(policy_json)?;
        Ok(WasmEditor {
            inner: Editor::with_parts(doc, policy, Default::default()),
        })
    }

    fn drop_outcome(&mut self, pos: Option<u32>) -> JsDropOutcome {
        self.inner.drop_at(pos.map(|p| p as usize)).into()
    }

    fn highlight(&self, pos: Option<u32>) -> Option<JsHighlight> {
        self.inner.drag_over_at(pos.map(|p| p as usize)).map(|target| JsHighlight {
            pos: target.pos,
            side: match target.side {
                Side::Before => "before",
                Side::After => "after",
            },
            group: target.group,
        })
    }
}

#[wasm_bindgen]
impl WasmEditor {
    /// `policy_json` may be omitted; missing fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(doc_json: String, policy_json: Option<String>) -> Result<WasmEditor, JsValue> {
        WasmEditor::from_json(&doc_json, policy_json).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = groupBlocks)]
    pub fn group_blocks(&mut self, positions: Vec<u32>) -> bool {
        let positions = positions.into_iter().map(|p| p as usize).collect();
        self.inner.execute(Command::GroupBlocks(positions))
    }

    #[wasm_bindgen(js_name = ungroupBlock)]
    pub fn ungroup_block(&mut self, pos: u32) -> bool {
        self.inner.execute(Command::UngroupBlock(pos as usize))
    }

    #[wasm_bindgen(js_name = moveBlock)]
    pub fn move_block(&mut self, from: u32, to: u32) -> bool {
        self.inner.execute(Command::MoveBlock {
            from: from as usize,
            to: to as usize,
        })
    }

    /// Run a named command, e.g. `{"command":"ungroupBlock","args":4}`.
    pub fn execute(&mut self, command_json: String) -> Result<bool, JsValue> {
        let command: Command = serde_json::from_str(&command_json).map_err(js_err)?;
        Ok(self.inner.execute(command))
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, pos: u32) -> bool {
        self.inner.drag_start(pos as usize)
    }

    /// Highlight candidate for the hovered position, or `null`.
    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&self, pos: Option<u32>) -> Result<JsValue, JsValue> {
        to_value(&self.highlight(pos)).map_err(js_err)
    }

    /// `pos` is `undefined` when the pointer is outside the document.
    pub fn drop(&mut self, pos: Option<u32>) -> Result<JsValue, JsValue> {
        let outcome = self.drop_outcome(pos);
        to_value(&outcome).map_err(js_err)
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) {
        self.inner.drag_end();
    }

    /// Next scheduler turn: runs deferred follow-ups and returns how many ran.
    pub fn tick(&mut self) -> u32 {
        self.inner.run_follow_ups() as u32
    }

    pub fn document(&self) -> Result<JsValue, JsValue> {
        to_value(self.inner.document()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.document()).map_err(js_err)
    }

    pub fn version(&self) -> f64 {
        self.inner.document().version() as f64
    }
}
