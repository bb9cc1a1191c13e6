//! 扁平评论列表 -> 嵌套评论树。
//!
//! 两步完成：先按 id 建索引，再按输入顺序把每条评论挂到父节点下。
//! 节点之间只通过下标互相引用，最后一次性物化为拥有所有权的树。

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::Comment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// 本节点加上所有后代的数量
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }
}

/// 输入应已过滤为同一篇文章的已审核评论。
///
/// - 父评论不在输入中（悬空引用）的评论会被提升为根，而不是丢弃。
/// - 同一父节点下的回复保持输入顺序。
/// - 因环形引用而无法从任何根到达的评论，按输入顺序追加为根；环上的回边不再跟随。
/// - 重复 id 属于调用方错误，debug 构建下直接 panic。
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let (children, roots) = link(&comments);

    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut forest: Vec<CommentNode> = roots
        .into_iter()
        .filter_map(|i| materialize(i, &mut slots, &children))
        .collect();

    for i in 0..slots.len() {
        if let Some(node) = materialize(i, &mut slots, &children) {
            forest.push(node);
        }
    }

    forest
}

fn link(comments: &[Comment]) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (i, c) in comments.iter().enumerate() {
        match index.entry(c.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
            Entry::Occupied(_) => {
                debug_assert!(false, "duplicate comment id in thread input: {}", c.id);
            }
        }
    }

    let mut children = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    (children, roots)
}

fn materialize(
    i: usize,
    slots: &mut [Option<Comment>],
    children: &[Vec<usize>],
) -> Option<CommentNode> {
    let comment = slots[i].take()?;
    let replies = children[i]
        .iter()
        .filter_map(|&child| materialize(child, slots, children))
        .collect();
    Some(CommentNode { comment, replies })
}
