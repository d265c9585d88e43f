//! Parent/child linking of project descriptors
//!
//! Descriptors are stored flat in an arena and linked in two passes: first
//! every descriptor gets an effective group (its own, or the one named by
//! its parent reference), then each parent reference is matched against the
//! identifiers of the other descriptors. A descriptor whose group is still
//! unknown inherits it from the parent it was linked to, and linking repeats
//! until nothing changes. Links are plain indices, so the graph holds no
//! reference cycles and can be read from several threads.

use super::descriptor::ProjectDescriptor;

#[derive(Debug)]
struct Node {
    descriptor: ProjectDescriptor,
    group: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Linked set of project descriptors
#[derive(Debug)]
pub struct ProjectGraph {
    nodes: Vec<Node>,
}

impl ProjectGraph {
    /// Build the graph from descriptors in arena order
    pub fn build(descriptors: Vec<ProjectDescriptor>) -> Self {
        let mut nodes: Vec<Node> = descriptors
            .into_iter()
            .map(|descriptor| Node {
                group: descriptor.model.declared_group().to_string(),
                descriptor,
                parent: None,
                children: Vec::new(),
            })
            .collect();

        // Each round either links a node or fills a group, so this ends
        for _ in 0..=nodes.len() {
            let links: Vec<Option<usize>> = (0..nodes.len()).map(|i| find_parent(&nodes, i)).collect();
            let mut changed = false;
            for (i, link) in links.into_iter().enumerate() {
                if nodes[i].parent != link {
                    nodes[i].parent = link;
                    changed = true;
                }
            }
            for i in 0..nodes.len() {
                if nodes[i].group.is_empty() {
                    if let Some(parent) = nodes[i].parent {
                        if !nodes[parent].group.is_empty() {
                            nodes[i].group = nodes[parent].group.clone();
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        break_cycles(&mut nodes);

        for i in 0..nodes.len() {
            if let Some(parent) = nodes[i].parent {
                nodes[parent].children.push(i);
            }
        }

        Self { nodes }
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Descriptor at `index`
    pub fn descriptor(&self, index: usize) -> &ProjectDescriptor {
        &self.nodes[index].descriptor
    }

    /// Effective group of the descriptor at `index`
    pub fn group(&self, index: usize) -> &str {
        &self.nodes[index].group
    }

    /// Linked parent, if any
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent
    }

    /// Linked children in arena order
    pub fn children(&self, index: usize) -> &[usize] {
        &self.nodes[index].children
    }

    /// Descriptors without a parent in the set
    pub fn roots(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].parent.is_none())
            .collect()
    }

    /// Ancestors of `index`, nearest first
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.nodes[index].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent].parent;
        }
        chain
    }

    /// `index` and all of its descendants, depth-first
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.nodes[current].children.iter().rev());
        }
        order
    }
}

fn find_parent(nodes: &[Node], index: usize) -> Option<usize> {
    let parent_ref = nodes[index].descriptor.model.parent.as_ref()?;
    let group = parent_ref.group_id.trim();
    let artifact = parent_ref.artifact_id.trim();
    let version = parent_ref.version.trim();

    nodes.iter().enumerate().position(|(i, candidate)| {
        let model = &candidate.descriptor.model;
        i != index
            && candidate.group == group
            && model.artifact_id.trim() == artifact
            && (version.is_empty() || model.effective_version().trim() == version)
    })
}

fn break_cycles(nodes: &mut [Node]) {
    for start in 0..nodes.len() {
        let mut current = nodes[start].parent;
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == start || steps > nodes.len() {
                tracing::debug!(
                    path = %nodes[start].descriptor.path.display(),
                    "parent chain loops back; treating descriptor as a root"
                );
                nodes[start].parent = None;
                break;
            }
            current = nodes[parent].parent;
            steps += 1;
        }
    }
}
