//! Option graphs: branching conversations as verb targets.
//!
//! The full dialogue system lives outside the core pipeline; what the
//! pipeline needs is that conversing suspends a command exactly like a
//! clarification prompt does. A graph is a set of nodes with labelled
//! choices; selecting one narrates its response and either walks to another
//! node or ends the conversation.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{AuthoringError, EngineResult};
use crate::flow::{Flow, Prompt, PromptOption};
use crate::session::Session;
use crate::verb::Invocation;

/// One labelled choice at a node.
#[derive(Debug, Clone)]
pub struct GraphChoice {
    /// The label shown to the player.
    pub label: String,
    /// Text narrated when this choice is selected.
    pub response: Option<String>,
    /// Node to walk to next; None ends the conversation.
    pub goto: Option<String>,
    /// Whether the choice disappears after being selected once.
    pub once: bool,
}

impl GraphChoice {
    /// A choice with just a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            response: None,
            goto: None,
            once: false,
        }
    }

    /// Set the response text.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Branch to another node after the response.
    pub fn with_goto(mut self, node: impl Into<String>) -> Self {
        self.goto = Some(node.into());
        self
    }

    /// Hide the choice after its first selection.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// One node: text plus its choices.
#[derive(Debug, Clone)]
pub struct OptionNode {
    /// Node id, unique within the graph.
    pub id: String,
    /// Text narrated on arrival.
    pub text: String,
    /// Choices offered here; an empty list ends the conversation.
    pub choices: Vec<GraphChoice>,
}

impl OptionNode {
    /// A node with text and no choices yet.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            choices: Vec::new(),
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: GraphChoice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// A named conversation graph.
#[derive(Debug, Clone)]
pub struct OptionGraph {
    /// Graph name, referenced by `Action::Converse`.
    pub name: String,
    start: String,
    nodes: HashMap<String, OptionNode>,
}

impl OptionGraph {
    /// A graph starting at the given node id.
    pub fn new(name: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            nodes: HashMap::new(),
        }
    }

    /// Add a node.
    pub fn with_node(mut self, node: OptionNode) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Check that the start node and every goto target exist.
    ///
    /// A dangling node id is an authoring defect and fails hard at
    /// registration, not during play.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.nodes.contains_key(&self.start) {
            return Err(AuthoringError::UnknownOptionNode {
                graph: self.name.clone(),
                node: self.start.clone(),
            });
        }
        for node in self.nodes.values() {
            for choice in &node.choices {
                if let Some(goto) = &choice.goto
                    && !self.nodes.contains_key(goto)
                {
                    return Err(AuthoringError::UnknownOptionNode {
                        graph: self.name.clone(),
                        node: goto.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn node(&self, id: &str) -> Option<&OptionNode> {
        self.nodes.get(id)
    }
}

/// Suspend into a graph from its start node.
pub(crate) fn begin(sess: &mut Session, graph: String, inv: Invocation) -> Flow {
    let Some(start) = sess.graph(&graph).map(|g| g.start.clone()) else {
        warn!(%graph, "conversation references unregistered graph");
        return Flow::Done(false);
    };
    visit(sess, graph, start, inv)
}

fn visit(sess: &mut Session, graph: String, node_id: String, inv: Invocation) -> Flow {
    let Some(node) = sess.graph(&graph).and_then(|g| g.node(&node_id)).cloned() else {
        warn!(%graph, node = %node_id, "conversation reached missing node");
        return Flow::Done(false);
    };
    sess.say(node.text.clone());

    let open: Vec<(usize, GraphChoice)> = node
        .choices
        .into_iter()
        .enumerate()
        .filter(|(index, choice)| {
            !(choice.once && sess.graph_choice_selected(&graph, &node_id, *index))
        })
        .collect();
    if open.is_empty() {
        return Flow::Done(true);
    }

    let options = open
        .into_iter()
        .map(|(index, choice)| {
            let graph = graph.clone();
            let node_id = node_id.clone();
            let inv = inv.clone();
            let label = choice.label.clone();
            PromptOption::new(
                label,
                Box::new(move |sess: &mut Session| {
                    sess.mark_graph_choice(&graph, &node_id, index);
                    if let Some(response) = &choice.response {
                        sess.say(response.clone());
                    }
                    match choice.goto {
                        Some(next) => visit(sess, graph, next, inv),
                        None => Flow::Done(true),
                    }
                }),
            )
        })
        .collect();

    Flow::Awaiting(Prompt::new(String::new(), options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph() -> OptionGraph {
        OptionGraph::new("parrot", "hello")
            .with_node(
                OptionNode::new("hello", "The parrot eyes you.")
                    .with_choice(
                        GraphChoice::new("Ask about the ship")
                            .with_response("\"Ship! Ship!\"")
                            .with_goto("ship"),
                    )
                    .with_choice(GraphChoice::new("Leave").with_response("It loses interest.")),
            )
            .with_node(OptionNode::new("ship", "It bobs its head."))
    }

    #[test]
    fn valid_graph_passes() {
        assert!(two_node_graph().validate().is_ok());
    }

    #[test]
    fn unknown_goto_fails_validation() {
        let graph = OptionGraph::new("bad", "start").with_node(
            OptionNode::new("start", "hi")
                .with_choice(GraphChoice::new("go").with_goto("nowhere")),
        );
        assert!(matches!(
            graph.validate(),
            Err(AuthoringError::UnknownOptionNode { .. })
        ));
    }

    #[test]
    fn unknown_start_fails_validation() {
        let graph = OptionGraph::new("bad", "missing");
        assert!(matches!(
            graph.validate(),
            Err(AuthoringError::UnknownOptionNode { .. })
        ));
    }
}
