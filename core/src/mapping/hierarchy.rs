//! Flat path-keyed items grouped into a parent/children tree.

use core::hash::Hash;

use hashbrown::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct Node<T> {
    pub value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Tree of items keyed by paths. The root corresponds to the empty path; a
/// node's children are the items whose path extends its own by one key.
#[derive(Debug)]
pub struct Hierarchy<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Hierarchy<T> {
    /// Build the tree from `items`. Ancestors that no item names, the root
    /// included, are produced by `synthesize` from their path. When two items
    /// share a path the later one wins; children keep the order in which
    /// their paths first appeared.
    pub fn build<K, I, P, S>(items: I, path_of: P, mut synthesize: S) -> Self
    where
        K: Clone + Eq + Hash,
        I: IntoIterator<Item = T>,
        P: Fn(&T) -> &[K],
        S: FnMut(&[K]) -> T,
    {
        let mut tree = Hierarchy {
            nodes: vec![Node {
                value: synthesize(&[]),
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut index: HashMap<Vec<K>, NodeId> = HashMap::new();
        index.insert(Vec::new(), tree.root());

        for item in items {
            let path = path_of(&item).to_vec();
            let mut parent = tree.root();
            for depth in 1..path.len() {
                let prefix = &path[..depth];
                parent = match index.get(prefix) {
                    Some(&id) => id,
                    None => {
                        let id = tree.push(parent, synthesize(prefix));
                        index.insert(prefix.to_vec(), id);
                        id
                    }
                };
            }
            match index.get(&path) {
                Some(&id) => tree.nodes[id.0].value = item,
                None => {
                    let id = tree.push(parent, item);
                    index.insert(path, id);
                }
            }
        }
        tree
    }

    fn push(&mut self, parent: NodeId, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn value(&self, id: NodeId) -> &T {
        &self.nodes[id.0].value
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(items: &[(&'static str, &'static str)]) -> Hierarchy<(Vec<char>, String)> {
        Hierarchy::build(
            items
                .iter()
                .map(|(path, label)| (path.chars().collect::<Vec<_>>(), label.to_string())),
            |(path, _)| path.as_slice(),
            |prefix| (prefix.to_vec(), "synthesized".to_string()),
        )
    }

    fn describe(tree: &Hierarchy<(Vec<char>, String)>, id: NodeId, out: &mut Vec<String>) {
        let (path, label) = tree.value(id);
        out.push(format!("{}={}", path.iter().collect::<String>(), label));
        for &child in tree.children(id) {
            describe(tree, child, out);
        }
    }

    #[test]
    fn test_synthesizes_missing_ancestors() {
        let tree = build(&[("abc", "deep"), ("ad", "sibling")]);

        let mut out = Vec::new();
        describe(&tree, tree.root(), &mut out);
        assert_eq!(
            out,
            vec!["=synthesized", "a=synthesized", "ab=synthesized", "abc=deep", "ad=sibling"]
        );
        let ab = tree.children(tree.children(tree.root())[0])[0];
        assert_eq!(tree.parent(ab), Some(tree.children(tree.root())[0]));
    }

    #[test]
    fn test_explicit_item_replaces_synthesized() {
        let tree = build(&[("ab", "child"), ("a", "explicit"), ("", "root"), ("ab", "later")]);

        let mut out = Vec::new();
        describe(&tree, tree.root(), &mut out);
        assert_eq!(out, vec!["=root", "a=explicit", "ab=later"]);
        assert_eq!(tree.len(), 3);
    }
}
