//! Circuit
//!
//! The circuit owns every node in an arena and drives propagation through it.
//!
//! # Assembly
//!
//! Nodes are added one at a time and referenced by [`NodeId`]. Every edge is
//! checked when it is wired:
//!
//! 1. The destination must exist and must not be a constant.
//! 2. With strict widths on, the writer's output must fit the destination's
//!    input.
//! 3. The edge must not close a cycle: the destination may not already reach
//!    the writer.
//!
//! A rejected edge leaves the circuit unchanged.
//!
//! # Propagation
//!
//! Propagation is push-based, synchronous and depth-first. Writing to a node
//! runs its rule and recursively writes to its destinations in wiring order
//! before returning. Registers end a cascade: they never notify anyone.
//!
//! # Thread Safety
//!
//! The arena sits behind a read-write lock. A cascade holds a shared lock for
//! its whole duration, so cascades from several threads may run at once;
//! each register serializes its own writes. Structural changes fail with
//! [`CircuitError::ConcurrentMutation`] while a cascade is in flight. Plain
//! reads such as [`Circuit::value`] only delay them until the read returns.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

use super::node::{Node, NodeId, NodeKind, Sink};
use crate::component::{bits, Component, Consts, DataDestination, DataSource, Register};
use crate::config::CircuitConfig;
use crate::error::{CircuitError, Result};
use crate::gates::{Control, Not, PartWriter, Valve};
use crate::snapshot::{SavedRegister, Snapshot};

/// Node storage plus the lookup tables built alongside it.
#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Node>,
    registers: IndexMap<String, NodeId>,
    constants: HashMap<u64, NodeId>,
}

impl Arena {
    fn get(&self, node: NodeId) -> Result<&Node> {
        self.nodes
            .get(node.index())
            .ok_or(CircuitError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(node.index())
            .ok_or(CircuitError::UnknownNode(node))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn read(&self, node: NodeId) -> Result<u64> {
        match self.get(node)? {
            Node::Register(register) => Ok(register.get_value()),
            Node::Const(constant) => Ok(constant.get_value()),
            other => Err(CircuitError::NotReadable {
                node,
                kind: other.kind(),
            }),
        }
    }

    fn register(&self, node: NodeId) -> Result<&Register> {
        match self.get(node)? {
            Node::Register(register) => Ok(register),
            other => Err(CircuitError::NotARegister {
                node,
                kind: other.kind(),
            }),
        }
    }

    /// Whether `goal` can be reached from `start` along destination edges.
    fn reaches(&self, start: NodeId, goal: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if current == goal {
                return true;
            }
            let Some(seen) = visited.get_mut(current.index()) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;

            if let Some(node) = self.nodes.get(current.index()) {
                stack.extend(node.destinations().iter().copied());
            }
        }

        false
    }
}

/// Marks a cascade as in flight until dropped.
struct Cascade<'a> {
    arena: RwLockReadGuard<'a, Arena>,
    active: &'a AtomicUsize,
}

impl<'a> Cascade<'a> {
    fn begin(arena: &'a RwLock<Arena>, active: &'a AtomicUsize) -> Self {
        let arena = arena.read_recursive();
        active.fetch_add(1, Ordering::AcqRel);
        Self { arena, active }
    }
}

impl Drop for Cascade<'_> {
    fn drop(&mut self) {
        // Runs before the read guard is released.
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// An assembled propagation graph.
///
/// # Example
///
/// ```rust
/// use bcomp_core::gates::PartWriter;
/// use bcomp_core::graph::Circuit;
///
/// let circuit = Circuit::new();
/// let status = circuit.add_register("status", 8).unwrap();
/// let ready = circuit
///     .add_part_writer(PartWriter::new(status, 6, 1).unwrap())
///     .unwrap();
///
/// circuit.set_value(ready, 1).unwrap();
/// assert_eq!(circuit.value(status).unwrap(), 0b0100_0000);
/// ```
pub struct Circuit {
    arena: RwLock<Arena>,
    cascades: AtomicUsize,
    config: CircuitConfig,
}

impl Circuit {
    /// Create an empty circuit with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CircuitConfig::default())
    }

    /// Create an empty circuit.
    pub fn with_config(config: CircuitConfig) -> Self {
        Self {
            arena: RwLock::new(Arena::default()),
            cascades: AtomicUsize::new(0),
            config,
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    /// Exclusive access for structural changes.
    ///
    /// Refused while any cascade runs, including one on the calling thread,
    /// so the blocking `write` can only wait on plain readers.
    fn structure(&self) -> Result<RwLockWriteGuard<'_, Arena>> {
        if self.cascades.load(Ordering::Acquire) > 0 {
            return Err(CircuitError::ConcurrentMutation);
        }
        Ok(self.arena.write())
    }

    // ------------------------------------------------------------------------
    // Assembly
    // ------------------------------------------------------------------------

    /// Add a named register holding zero.
    pub fn add_register(&self, name: &str, width: u32) -> Result<NodeId> {
        let register = Register::new(name, width)?;
        let mut arena = self.structure()?;
        if arena.registers.contains_key(name) {
            return Err(CircuitError::DuplicateRegister(name.to_owned()));
        }
        let id = arena.push(Node::Register(register));
        arena.registers.insert(name.to_owned(), id);
        debug!(node = %id, name, width, "register added");
        Ok(id)
    }

    /// The node for a shared literal. Repeated calls return the same node.
    pub fn constant(&self, value: u64) -> Result<NodeId> {
        let constant = Consts::shared()
            .get(value)
            .ok_or(CircuitError::WidthMismatch {
                context: "constant table",
                needed: bits::width_of(value),
                available: bits::width_of(Consts::TABLE_SIZE - 1),
            })?;
        let mut arena = self.structure()?;
        if let Some(&id) = arena.constants.get(&value) {
            return Ok(id);
        }
        let id = arena.push(Node::Const(constant));
        arena.constants.insert(value, id);
        debug!(node = %id, value, "constant added");
        Ok(id)
    }

    /// Add a valve firing into `destinations`.
    pub fn add_valve(&self, valve: Valve, destinations: &[NodeId]) -> Result<NodeId> {
        let mut arena = self.structure()?;
        self.check_field(&arena, valve.source, valve.startbit, valve.width(), "valve source")?;
        if let Some(tap) = valve.tap {
            self.check_field(&arena, tap.source, tap.startbit, tap.width(), "valve tap")?;
        }
        self.insert_gate(&mut arena, Node::Valve(valve), destinations)
    }

    /// Add a control driving `destinations`.
    pub fn add_control(&self, control: Control, destinations: &[NodeId]) -> Result<NodeId> {
        let mut arena = self.structure()?;
        self.insert_gate(&mut arena, Node::Control(control), destinations)
    }

    /// Add an inverter driving `destinations`.
    pub fn add_not(&self, not: Not, destinations: &[NodeId]) -> Result<NodeId> {
        let mut arena = self.structure()?;
        self.insert_gate(&mut arena, Node::Not(not), destinations)
    }

    /// Add a bit-field writer into a register.
    pub fn add_part_writer(&self, writer: PartWriter) -> Result<NodeId> {
        let mut arena = self.structure()?;
        let target = arena.register(writer.target)?;
        let end = writer.startbit.saturating_add(writer.width());
        let available = target.component().width();
        if self.config.strict_widths && end > available {
            return Err(CircuitError::WidthMismatch {
                context: "part writer field",
                needed: end,
                available,
            });
        }
        let id = arena.push(Node::PartWriter(writer));
        debug!(
            node = %id,
            target = %writer.target,
            startbit = writer.startbit,
            width = writer.width(),
            "part writer added"
        );
        Ok(id)
    }

    /// Add an external destination receiving values reduced to `width` bits.
    pub fn add_sink(&self, width: u32, target: Arc<dyn DataDestination>) -> Result<NodeId> {
        let component = Component::new(width)?;
        let mut arena = self.structure()?;
        let id = arena.push(Node::Sink(Sink { component, target }));
        debug!(node = %id, width, "sink added");
        Ok(id)
    }

    /// Append destinations to a valve, control or inverter.
    ///
    /// Existing destinations keep firing first, in their original order.
    pub fn add_destination(&self, node: NodeId, destinations: &[NodeId]) -> Result<()> {
        let mut arena = self.structure()?;
        self.connect(&mut arena, node, destinations)?;
        debug!(node = %node, added = destinations.len(), "destinations appended");
        Ok(())
    }

    fn insert_gate(
        &self,
        arena: &mut Arena,
        node: Node,
        destinations: &[NodeId],
    ) -> Result<NodeId> {
        let kind = node.kind();
        let id = arena.push(node);
        if let Err(err) = self.connect(arena, id, destinations) {
            arena.nodes.pop();
            return Err(err);
        }
        debug!(node = %id, ?kind, destinations = destinations.len(), "gate added");
        Ok(id)
    }

    /// Validate every edge `from -> to` first, then append them all.
    fn connect(&self, arena: &mut Arena, from: NodeId, destinations: &[NodeId]) -> Result<()> {
        let writer = arena.get(from)?;
        let Some(output) = writer.output_width() else {
            return Err(CircuitError::NoDestinations {
                node: from,
                kind: writer.kind(),
            });
        };

        for &to in destinations {
            let target = arena.get(to)?;
            if let Node::Const(constant) = target {
                return Err(CircuitError::ImmutableWrite {
                    value: constant.value(),
                });
            }
            if self.config.strict_widths {
                if let Some(input) = target.input_width() {
                    if output > input {
                        return Err(CircuitError::WidthMismatch {
                            context: "destination input",
                            needed: output,
                            available: input,
                        });
                    }
                }
            }
            if to == from || arena.reaches(to, from) {
                debug!(from = %from, to = %to, "edge rejected: cycle");
                return Err(CircuitError::Cycle { from, to });
            }
        }

        if let Some(list) = arena.get_mut(from)?.destinations_mut() {
            list.extend(destinations.iter().copied());
        }
        Ok(())
    }

    fn check_field(
        &self,
        arena: &Arena,
        source: NodeId,
        startbit: u32,
        width: u32,
        context: &'static str,
    ) -> Result<()> {
        let node = arena.get(source)?;
        let available = node.readable_width().ok_or(CircuitError::NotReadable {
            node: source,
            kind: node.kind(),
        })?;
        let needed = startbit.saturating_add(width);
        if self.config.strict_widths && needed > available {
            return Err(CircuitError::WidthMismatch {
                context,
                needed,
                available,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------------

    /// Write `value` to a node and run the cascade it starts.
    pub fn set_value(&self, node: NodeId, value: u64) -> Result<()> {
        let cascade = Cascade::begin(&self.arena, &self.cascades);
        self.write(&cascade.arena, node, value, 0)
    }

    /// Trigger a node on its own.
    ///
    /// A valve re-reads its source; a control writes its literal. Other
    /// kinds fail with [`CircuitError::NotTriggerable`].
    pub fn propagate(&self, node: NodeId) -> Result<()> {
        let cascade = Cascade::begin(&self.arena, &self.cascades);
        let arena = &*cascade.arena;
        match arena.get(node)? {
            Node::Valve(valve) => self.evaluate(arena, node, valve, 0),
            Node::Control(control) => {
                trace!(node = %node, value = control.literal(), "control activated");
                self.fan_out(arena, &control.destinations, control.literal(), 1)
            }
            other => Err(CircuitError::NotTriggerable {
                node,
                kind: other.kind(),
            }),
        }
    }

    fn write(&self, arena: &Arena, node: NodeId, value: u64, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            warn!(node = %node, limit = self.config.max_depth, "cascade aborted");
            return Err(CircuitError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        match arena.get(node)? {
            Node::Register(register) => {
                trace!(node = %node, value, "register write");
                register.set_value(value);
                Ok(())
            }
            Node::Const(constant) => constant.try_set_value(value),
            Node::Valve(valve) => self.evaluate(arena, node, valve, depth),
            Node::Control(control) => {
                let forwarded = control.forward(value);
                trace!(node = %node, value = forwarded, "control forward");
                self.fan_out(arena, &control.destinations, forwarded, depth + 1)
            }
            Node::Not(not) => {
                let inverted = not.invert(value);
                trace!(node = %node, value = inverted, "not forward");
                self.fan_out(arena, &not.destinations, inverted, depth + 1)
            }
            Node::PartWriter(writer) => {
                trace!(node = %node, target = %writer.target, value, "part write");
                writer.write(arena.register(writer.target)?, value);
                Ok(())
            }
            Node::Sink(sink) => {
                trace!(node = %node, value, "sink write");
                sink.target.set_value(sink.component.clamp(value));
                Ok(())
            }
        }
    }

    fn evaluate(&self, arena: &Arena, node: NodeId, valve: &Valve, depth: usize) -> Result<()> {
        let selected = valve.select(arena.read(valve.source)?);
        if !valve.is_open(selected) {
            trace!(node = %node, selected, condition = valve.condition, "valve closed");
            return Ok(());
        }
        let output = match valve.tap {
            Some(tap) => tap.select(arena.read(tap.source)?),
            None => selected,
        };
        trace!(node = %node, value = output, "valve open");
        self.fan_out(arena, &valve.destinations, output, depth + 1)
    }

    fn fan_out(
        &self,
        arena: &Arena,
        destinations: &[NodeId],
        value: u64,
        depth: usize,
    ) -> Result<()> {
        for &destination in destinations {
            self.write(arena, destination, value, depth)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Current value of a register or constant.
    pub fn value(&self, node: NodeId) -> Result<u64> {
        self.arena.read_recursive().read(node)
    }

    /// A shared handle to a register's cell.
    pub fn register(&self, node: NodeId) -> Result<Register> {
        self.arena.read_recursive().register(node).cloned()
    }

    /// The register created under `name`.
    pub fn register_by_name(&self, name: &str) -> Option<NodeId> {
        self.arena.read_recursive().registers.get(name).copied()
    }

    /// Kind of a node.
    pub fn kind(&self, node: NodeId) -> Result<NodeKind> {
        Ok(self.arena.read_recursive().get(node)?.kind())
    }

    /// Destinations of a node in firing order. Empty for leaves.
    pub fn destinations(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.arena.read_recursive().get(node)?.destinations().to_vec())
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.arena.read_recursive().nodes.len()
    }

    /// All nodes ordered so that every node precedes its destinations.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let arena = self.arena.read_recursive();
        let count = arena.nodes.len();
        let mut in_degree = vec![0usize; count];
        for node in &arena.nodes {
            for destination in node.destinations() {
                in_degree[destination.index()] += 1;
            }
        }

        let mut queue: VecDeque<NodeId> = (0..count)
            .filter(|&i| in_degree[i] == 0)
            .map(NodeId::from)
            .collect();
        let mut order = Vec::with_capacity(count);

        // Kahn's algorithm
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &destination in arena.nodes[id.index()].destinations() {
                let degree = &mut in_degree[destination.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(destination);
                }
            }
        }

        if order.len() == count {
            return Ok(order);
        }

        // Only reachable if an edge slipped past assembly checks.
        let (from, to) = arena
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| in_degree[*i] > 0)
            .find_map(|(i, node)| {
                node.destinations()
                    .iter()
                    .find(|d| in_degree[d.index()] > 0)
                    .map(|&d| (NodeId::from(i), d))
            })
            .unwrap_or((NodeId::from(0), NodeId::from(0)));
        Err(CircuitError::Cycle { from, to })
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Capture every named register.
    pub fn snapshot(&self) -> Snapshot {
        let arena = self.arena.read_recursive();
        let registers = arena
            .registers
            .iter()
            .filter_map(|(name, &id)| {
                let register = arena.register(id).ok()?;
                Some((
                    name.clone(),
                    SavedRegister {
                        width: register.component().width(),
                        value: register.get_value(),
                    },
                ))
            })
            .collect();
        Snapshot { registers }
    }

    /// Write saved values back. Nothing is written unless every entry
    /// matches a register of the same width. No cascade is started.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let arena = self.arena.read_recursive();
        let mut writes = Vec::with_capacity(snapshot.registers.len());

        for (name, saved) in &snapshot.registers {
            let id = arena
                .registers
                .get(name)
                .copied()
                .ok_or_else(|| CircuitError::UnknownRegister(name.clone()))?;
            let register = arena.register(id)?;
            let width = register.component().width();
            if width != saved.width {
                return Err(CircuitError::WidthMismatch {
                    context: "snapshot restore",
                    needed: saved.width,
                    available: width,
                });
            }
            writes.push((register, saved.value));
        }

        for (register, value) in writes {
            register.set_value(value);
        }
        debug!(registers = snapshot.registers.len(), "snapshot restored");
        Ok(())
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit")
            .field("nodes", &self.node_count())
            .field("config", &self.config)
            .finish()
    }
}
