//! Compiles the current shape of an `AvlTree<i32, i32>` into x86-64 code.
//!
//! Every node becomes a compare-and-branch block, so a lookup runs as a chain
//! of jumps with no memory traffic for the tree itself. The compiled code is a
//! snapshot: later mutations of the tree are not reflected.

use crate::avl::AvlTree;
use crate::error::JitError;
use crate::node::NodeId;
use crate::raw::RawTree;
use crate::search_tree::SearchTree;

use dynasmrt::{DynasmApi, DynasmLabelApi, ExecutableBuffer, dynasm};
use log::debug;
use std::collections::HashMap;

// Takes a key, returns `FOUND | value as u32` on a hit and 0 on a miss.
type JittedLookup = unsafe extern "sysv64" fn(key: i32) -> u64;

const FOUND: u64 = 1 << 32;

pub struct CompiledLookup {
    // Owns the executable pages `func` points into.
    _buf: ExecutableBuffer,
    func: JittedLookup,
    len: usize,
}

impl CompiledLookup {
    pub fn get(&self, key: i32) -> Option<i32> {
        // SAFETY: `func` points at code emitted by `compile` into `_buf`,
        // which lives as long as `self`, and follows the sysv64 ABI.
        let raw = unsafe { (self.func)(key) };
        (raw & FOUND != 0).then_some(raw as u32 as i32)
    }

    /// Number of entries compiled in.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub fn compile(tree: &AvlTree<i32, i32>) -> Result<CompiledLookup, JitError> {
    let mut ops = dynasmrt::x64::Assembler::new()?;

    let start = ops.offset();

    // A map from node handle to the dynasm label for that node's code block
    let mut labels = HashMap::new();

    let not_found_label = ops.new_dynamic_label();

    let raw = tree.raw();
    if let Some(root) = raw.root() {
        build_asm(&mut ops, raw, root, &mut labels, not_found_label);
    }

    dynasm!(ops
        ; =>not_found_label
        ; xor eax, eax
        ; ret
    );

    let buf = ops.finalize().map_err(|_| JitError::Finalize)?;
    // SAFETY: `start` is the entry of the function emitted above, which
    // matches the `JittedLookup` signature.
    let func: JittedLookup = unsafe { std::mem::transmute(buf.ptr(start)) };

    debug!("compiled lookup for {} nodes into {} bytes", tree.len(), buf.len());
    Ok(CompiledLookup {
        _buf: buf,
        func,
        len: tree.len(),
    })
}

// Emits the block for `id` and, in pre-order, its subtrees.
fn build_asm(
    ops: &mut dynasmrt::x64::Assembler,
    raw: &RawTree<i32, i32>,
    id: NodeId,
    labels: &mut HashMap<NodeId, dynasmrt::DynamicLabel>,
    not_found_label: dynasmrt::DynamicLabel,
) {
    let node = raw.node(id);
    let key = node.key;
    let result = (FOUND | u64::from(node.value as u32)) as i64;

    let self_label = *labels.entry(id).or_insert_with(|| ops.new_dynamic_label());
    let found_label = ops.new_dynamic_label();

    dynasm!(ops; =>self_label);

    // The key arrives in edi
    dynasm!(ops
        ; cmp edi, key
        ; je =>found_label
    );

    let left_label = match node.left() {
        Some(left) => *labels.entry(left).or_insert_with(|| ops.new_dynamic_label()),
        None => not_found_label,
    };
    dynasm!(ops; jl =>left_label);

    let right_label = match node.right() {
        Some(right) => *labels.entry(right).or_insert_with(|| ops.new_dynamic_label()),
        None => not_found_label,
    };
    dynasm!(ops; jg =>right_label);

    if let Some(left) = node.left() {
        build_asm(ops, raw, left, labels, not_found_label);
    }
    if let Some(right) = node.right() {
        build_asm(ops, raw, right, labels, not_found_label);
    }

    dynasm!(ops
        ; =>found_label
        ; mov rax, QWORD result
        ; ret
    );
}
