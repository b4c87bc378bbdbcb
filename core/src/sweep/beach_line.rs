//! Beach line: arcs in an arena, ordered by an AVL tree with parent links and
//! a doubly linked list for constant-time neighbours.
//!
//! Breakpoint positions are never stored; they are recomputed from the two
//! sites and the current sweep position whenever the tree is searched.

use serde::Serialize;
use tracing::trace;

use super::events::{EventKey, EventQueue};
use crate::diagram::{DiagramBuilder, EdgeId, VertexId};
use crate::geometry::{arc_y, bisector_x, circle_event_point, Point2};
use crate::sites::{Site, SiteId, SiteSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArcId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BreakpointId(pub usize);

/// `Plus` when the left arc's site is the higher of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    Minus,
    Plus,
}

impl Sign {
    pub fn of(left: &Site, right: &Site) -> Self {
        if left.is_above(right) {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Sign::Minus => '-',
            Sign::Plus => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub site: SiteId,
    pub left_breakpoint: Option<BreakpointId>,
    pub right_breakpoint: Option<BreakpointId>,
    /// Scheduled circle event in which this arc vanishes.
    pub circle_event: Option<EventKey>,
    prev: Option<ArcId>,
    next: Option<ArcId>,
    parent: Option<ArcId>,
    left: Option<ArcId>,
    right: Option<ArcId>,
    height: i32,
    alive: bool,
}

impl Arc {
    fn new(site: SiteId) -> Self {
        Self {
            site,
            left_breakpoint: None,
            right_breakpoint: None,
            circle_event: None,
            prev: None,
            next: None,
            parent: None,
            left: None,
            right: None,
            height: 1,
            alive: true,
        }
    }

    pub fn prev(&self) -> Option<ArcId> {
        self.prev
    }

    pub fn next(&self) -> Option<ArcId> {
        self.next
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub left_arc: ArcId,
    pub right_arc: ArcId,
    pub sign: Sign,
    /// Half-edge traced by this breakpoint.
    pub edge: EdgeId,
    pub alive: bool,
}

/// Shared handles a beach-line mutation needs besides the tree itself.
pub struct Sweep<'a> {
    pub sites: &'a SiteSet,
    pub queue: &'a mut EventQueue,
    pub diagram: &'a mut DiagramBuilder,
    pub sweep_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeachLine {
    arcs: Vec<Arc>,
    breakpoints: Vec<Breakpoint>,
    root: Option<ArcId>,
    head: Option<ArcId>,
    len: usize,
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.0]
    }

    pub fn breakpoint(&self, id: BreakpointId) -> &Breakpoint {
        &self.breakpoints[id.0]
    }

    /// Arcs from left to right.
    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, &Arc)> + '_ {
        std::iter::successors(self.head, move |id| self.arcs[id.0].next).map(move |id| (id, &self.arcs[id.0]))
    }

    /// Live breakpoints from left to right.
    pub fn breakpoints(&self) -> impl Iterator<Item = (BreakpointId, &Breakpoint)> + '_ {
        self.arcs()
            .filter_map(|(_, arc)| arc.right_breakpoint)
            .map(move |id| (id, &self.breakpoints[id.0]))
    }

    pub fn breakpoint_x(&self, id: BreakpointId, sites: &SiteSet, sweep_y: f64) -> f64 {
        let bp = &self.breakpoints[id.0];
        let left = sites.get(self.arcs[bp.left_arc.0].site);
        let right = sites.get(self.arcs[bp.right_arc.0].site);
        bisector_x(left, right, sweep_y)
    }

    /// Arc covering `x` at this sweep. Ties on a breakpoint go to the right arc.
    pub fn locate(&self, x: f64, sites: &SiteSet, sweep_y: f64) -> Option<ArcId> {
        let mut node = self.root;
        let mut last = None;
        while let Some(id) = node {
            last = Some(id);
            let arc = &self.arcs[id.0];
            if let Some(bp) = arc.left_breakpoint {
                if x < self.breakpoint_x(bp, sites, sweep_y) {
                    node = arc.left;
                    continue;
                }
            }
            if let Some(bp) = arc.right_breakpoint {
                if x >= self.breakpoint_x(bp, sites, sweep_y) {
                    node = arc.right;
                    continue;
                }
            }
            return Some(id);
        }
        last
    }

    /// Whether a dequeued circle event still describes three adjacent arcs.
    pub fn is_current(&self, arc: ArcId, sites: [SiteId; 3], key: &EventKey) -> bool {
        let Some(a) = self.arcs.get(arc.0) else {
            return false;
        };
        if !a.alive || a.site != sites[1] || a.circle_event.as_ref() != Some(key) {
            return false;
        }
        let prev = a.prev.map(|p| self.arcs[p.0].site);
        let next = a.next.map(|n| self.arcs[n.0].site);
        prev == Some(sites[0]) && next == Some(sites[2])
    }

    // ========================================================================
    // Sweep operations
    // ========================================================================

    /// Adds the arc of `site` at its site event.
    pub fn insert_site(&mut self, site: &Site, ctx: &mut Sweep<'_>) -> ArcId {
        let Some(under) = self.locate(site.position.x, ctx.sites, ctx.sweep_y) else {
            let id = self.new_arc(site.id);
            self.root = Some(id);
            self.head = Some(id);
            self.len = 1;
            return id;
        };

        let under_site = ctx.sites.get(self.arcs[under.0].site);
        match arc_y(under_site, site.position.x, ctx.sweep_y) {
            Some(y) => self.split(under, site, Point2::new(site.position.x, y), ctx),
            None => self.insert_beside(under, site, ctx),
        }
    }

    /// Splits `under` into two pieces with the new arc between them.
    fn split(&mut self, under: ArcId, site: &Site, start: Point2, ctx: &mut Sweep<'_>) -> ArcId {
        self.drop_circle_event(under, ctx.queue);

        let outer = self.arcs[under.0].site;
        let (left_edge, right_edge) = ctx.diagram.open_twins(outer, site.id, start, ctx.sweep_y);

        let mid = self.new_arc(site.id);
        let tail = self.new_arc(outer);
        let old_right = self.arcs[under.0].right_breakpoint;

        let left_bp = self.new_breakpoint(under, mid, left_edge, ctx.sites);
        let right_bp = self.new_breakpoint(mid, tail, right_edge, ctx.sites);

        self.arcs[under.0].right_breakpoint = Some(left_bp);
        self.arcs[mid.0].left_breakpoint = Some(left_bp);
        self.arcs[mid.0].right_breakpoint = Some(right_bp);
        self.arcs[tail.0].left_breakpoint = Some(right_bp);
        self.arcs[tail.0].right_breakpoint = old_right;
        if let Some(bp) = old_right {
            self.breakpoints[bp.0].left_arc = tail;
        }

        self.attach_after(under, mid);
        self.attach_after(mid, tail);
        trace!(site = %site.name, arcs = self.len, "split arc");

        self.check_circle(under, ctx);
        self.check_circle(tail, ctx);
        mid
    }

    /// Arc under the new site is itself still a vertical ray: both sites sit
    /// on the same sweep row, so the new arc goes next to it.
    fn insert_beside(&mut self, under: ArcId, site: &Site, ctx: &mut Sweep<'_>) -> ArcId {
        let under_site_id = self.arcs[under.0].site;
        let to_right = site.position.x >= ctx.sites.get(under_site_id).position.x;
        let id = self.new_arc(site.id);

        if to_right {
            let outer = self.arcs[under.0].right_breakpoint;
            let edge = ctx.diagram.open_vertical(under_site_id, site.id, ctx.sweep_y);
            let bp = self.new_breakpoint(under, id, edge, ctx.sites);
            self.arcs[under.0].right_breakpoint = Some(bp);
            self.arcs[id.0].left_breakpoint = Some(bp);
            self.arcs[id.0].right_breakpoint = outer;
            if let Some(outer) = outer {
                self.breakpoints[outer.0].left_arc = id;
                self.refresh_breakpoint(outer, ctx);
            }
            self.attach_after(under, id);
        } else {
            let outer = self.arcs[under.0].left_breakpoint;
            let edge = ctx.diagram.open_vertical(site.id, under_site_id, ctx.sweep_y);
            let bp = self.new_breakpoint(id, under, edge, ctx.sites);
            self.arcs[under.0].left_breakpoint = Some(bp);
            self.arcs[id.0].right_breakpoint = Some(bp);
            self.arcs[id.0].left_breakpoint = outer;
            if let Some(outer) = outer {
                self.breakpoints[outer.0].right_arc = id;
                self.refresh_breakpoint(outer, ctx);
            }
            self.attach_before(under, id);
        }
        trace!(site = %site.name, arcs = self.len, "inserted beside bottom-row arc");

        let far = if to_right { self.arcs[id.0].next } else { self.arcs[id.0].prev };
        self.check_circle(under, ctx);
        self.check_circle(id, ctx);
        if let Some(far) = far {
            self.check_circle(far, ctx);
        }
        id
    }

    /// Removes `arc` at its circle event and returns the new vertex.
    pub fn remove_arc(&mut self, arc: ArcId, center: Point2, ctx: &mut Sweep<'_>) -> Option<VertexId> {
        let node = &self.arcs[arc.0];
        let (prev, next) = (node.prev?, node.next?);
        let (left_bp, right_bp) = (node.left_breakpoint?, node.right_breakpoint?);

        let vertex = ctx.diagram.add_circle_vertex(center);
        for bp in [left_bp, right_bp] {
            ctx.diagram.close_edge(self.breakpoints[bp.0].edge, vertex);
            self.breakpoints[bp.0].alive = false;
        }

        self.arcs[arc.0].circle_event = None;
        self.drop_circle_event(prev, ctx.queue);
        self.drop_circle_event(next, ctx.queue);
        self.detach(arc);

        let (left_site, right_site) = (self.arcs[prev.0].site, self.arcs[next.0].site);
        let edge = ctx.diagram.open_from_vertex(left_site, right_site, vertex, ctx.sweep_y);
        let bp = self.new_breakpoint(prev, next, edge, ctx.sites);
        self.arcs[prev.0].right_breakpoint = Some(bp);
        self.arcs[next.0].left_breakpoint = Some(bp);

        self.check_circle(prev, ctx);
        self.check_circle(next, ctx);
        Some(vertex)
    }

    /// Schedules the circle event of `arc` with its current neighbours,
    /// replacing any previous one.
    fn check_circle(&mut self, arc: ArcId, ctx: &mut Sweep<'_>) {
        self.drop_circle_event(arc, ctx.queue);
        let node = &self.arcs[arc.0];
        let (Some(prev), Some(next)) = (node.prev, node.next) else {
            return;
        };
        let a = ctx.sites.get(self.arcs[prev.0].site);
        let b = ctx.sites.get(node.site);
        let c = ctx.sites.get(self.arcs[next.0].site);
        if a.id == c.id {
            return;
        }
        if let Some(point) = circle_event_point(a, b, c, ctx.sweep_y) {
            let key = ctx.queue.push_circle(point, [a.id, b.id, c.id], arc);
            self.arcs[arc.0].circle_event = Some(key);
        }
    }

    fn drop_circle_event(&mut self, arc: ArcId, queue: &mut EventQueue) {
        if let Some(key) = self.arcs[arc.0].circle_event.take() {
            queue.invalidate(&key);
        }
    }

    fn new_arc(&mut self, site: SiteId) -> ArcId {
        self.arcs.push(Arc::new(site));
        ArcId(self.arcs.len() - 1)
    }

    fn new_breakpoint(&mut self, left: ArcId, right: ArcId, edge: EdgeId, sites: &SiteSet) -> BreakpointId {
        let sign = Sign::of(sites.get(self.arcs[left.0].site), sites.get(self.arcs[right.0].site));
        self.breakpoints.push(Breakpoint { left_arc: left, right_arc: right, sign, edge, alive: true });
        BreakpointId(self.breakpoints.len() - 1)
    }

    /// Re-derives sign and edge sites after one side of a breakpoint changed.
    fn refresh_breakpoint(&mut self, id: BreakpointId, ctx: &mut Sweep<'_>) {
        let bp = &self.breakpoints[id.0];
        let left = self.arcs[bp.left_arc.0].site;
        let right = self.arcs[bp.right_arc.0].site;
        let edge = bp.edge;
        self.breakpoints[id.0].sign = Sign::of(ctx.sites.get(left), ctx.sites.get(right));
        ctx.diagram.retarget(edge, [left, right]);
    }

    // ========================================================================
    // Tree maintenance
    // ========================================================================

    fn height(&self, node: Option<ArcId>) -> i32 {
        node.map_or(0, |id| self.arcs[id.0].height)
    }

    fn update_height(&mut self, id: ArcId) {
        let h = 1 + self.height(self.arcs[id.0].left).max(self.height(self.arcs[id.0].right));
        self.arcs[id.0].height = h;
    }

    fn balance_factor(&self, id: ArcId) -> i32 {
        self.height(self.arcs[id.0].left) - self.height(self.arcs[id.0].right)
    }

    fn replace_child(&mut self, parent: Option<ArcId>, old: ArcId, new: Option<ArcId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.arcs[p.0].left == Some(old) {
                    self.arcs[p.0].left = new;
                } else {
                    self.arcs[p.0].right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: ArcId) -> ArcId {
        let Some(y) = self.arcs[x.0].right else {
            return x;
        };
        let inner = self.arcs[y.0].left;
        let parent = self.arcs[x.0].parent;

        self.arcs[x.0].right = inner;
        if let Some(inner) = inner {
            self.arcs[inner.0].parent = Some(x);
        }
        self.arcs[y.0].left = Some(x);
        self.arcs[x.0].parent = Some(y);
        self.arcs[y.0].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: ArcId) -> ArcId {
        let Some(y) = self.arcs[x.0].left else {
            return x;
        };
        let inner = self.arcs[y.0].right;
        let parent = self.arcs[x.0].parent;

        self.arcs[x.0].left = inner;
        if let Some(inner) = inner {
            self.arcs[inner.0].parent = Some(x);
        }
        self.arcs[y.0].right = Some(x);
        self.arcs[x.0].parent = Some(y);
        self.arcs[y.0].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Walks to the root restoring heights and AVL balance.
    fn rebalance_from(&mut self, start: Option<ArcId>) {
        let mut node = start;
        while let Some(id) = node {
            self.update_height(id);
            let balance = self.balance_factor(id);
            let top = if balance > 1 {
                if let Some(left) = self.arcs[id.0].left {
                    if self.balance_factor(left) < 0 {
                        self.rotate_left(left);
                    }
                }
                self.rotate_right(id)
            } else if balance < -1 {
                if let Some(right) = self.arcs[id.0].right {
                    if self.balance_factor(right) > 0 {
                        self.rotate_right(right);
                    }
                }
                self.rotate_left(id)
            } else {
                id
            };
            node = self.arcs[top.0].parent;
        }
    }

    fn leftmost(&self, mut id: ArcId) -> ArcId {
        while let Some(left) = self.arcs[id.0].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: ArcId) -> ArcId {
        while let Some(right) = self.arcs[id.0].right {
            id = right;
        }
        id
    }

    /// Places `new` immediately after `anchor` in order.
    fn attach_after(&mut self, anchor: ArcId, new: ArcId) {
        let parent = match self.arcs[anchor.0].right {
            None => {
                self.arcs[anchor.0].right = Some(new);
                anchor
            }
            Some(right) => {
                let slot = self.leftmost(right);
                self.arcs[slot.0].left = Some(new);
                slot
            }
        };
        self.arcs[new.0].parent = Some(parent);

        let next = self.arcs[anchor.0].next;
        self.arcs[new.0].prev = Some(anchor);
        self.arcs[new.0].next = next;
        self.arcs[anchor.0].next = Some(new);
        if let Some(next) = next {
            self.arcs[next.0].prev = Some(new);
        }
        self.len += 1;
        self.rebalance_from(Some(parent));
    }

    /// Places `new` immediately before `anchor` in order.
    fn attach_before(&mut self, anchor: ArcId, new: ArcId) {
        let parent = match self.arcs[anchor.0].left {
            None => {
                self.arcs[anchor.0].left = Some(new);
                anchor
            }
            Some(left) => {
                let slot = self.rightmost(left);
                self.arcs[slot.0].right = Some(new);
                slot
            }
        };
        self.arcs[new.0].parent = Some(parent);

        let prev = self.arcs[anchor.0].prev;
        self.arcs[new.0].next = Some(anchor);
        self.arcs[new.0].prev = prev;
        self.arcs[anchor.0].prev = Some(new);
        match prev {
            Some(prev) => self.arcs[prev.0].next = Some(new),
            None => self.head = Some(new),
        }
        self.len += 1;
        self.rebalance_from(Some(parent));
    }

    fn transplant(&mut self, old: ArcId, new: Option<ArcId>) {
        let parent = self.arcs[old.0].parent;
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.arcs[new.0].parent = parent;
        }
    }

    /// Unlinks `id` from the tree and the neighbour list.
    fn detach(&mut self, id: ArcId) {
        let (left, right, parent) = (self.arcs[id.0].left, self.arcs[id.0].right, self.arcs[id.0].parent);
        let rebalance_start = match (left, right) {
            (None, _) => {
                self.transplant(id, right);
                parent
            }
            (Some(_), None) => {
                self.transplant(id, left);
                parent
            }
            (Some(left), Some(right)) => {
                let succ = self.leftmost(right);
                let start = if self.arcs[succ.0].parent != Some(id) {
                    let succ_parent = self.arcs[succ.0].parent;
                    let succ_right = self.arcs[succ.0].right;
                    self.transplant(succ, succ_right);
                    self.arcs[succ.0].right = Some(right);
                    self.arcs[right.0].parent = Some(succ);
                    succ_parent
                } else {
                    Some(succ)
                };
                self.transplant(id, Some(succ));
                self.arcs[succ.0].left = Some(left);
                self.arcs[left.0].parent = Some(succ);
                start
            }
        };
        self.rebalance_from(rebalance_start);

        let (prev, next) = (self.arcs[id.0].prev, self.arcs[id.0].next);
        match prev {
            Some(prev) => self.arcs[prev.0].next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            self.arcs[next.0].prev = prev;
        }

        let arc = &mut self.arcs[id.0];
        arc.prev = None;
        arc.next = None;
        arc.parent = None;
        arc.left = None;
        arc.right = None;
        arc.alive = false;
        self.len -= 1;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Checks ordering, adjacency and balance invariants.
    pub fn validate(&self, sites: &SiteSet, sweep_y: f64) -> Result<(), String> {
        let listed: Vec<ArcId> = self.arcs().map(|(id, _)| id).collect();
        if listed.len() != self.len {
            return Err(format!("list holds {} arcs, expected {}", listed.len(), self.len));
        }

        let mut in_order = Vec::with_capacity(self.len);
        self.collect_in_order(self.root, &mut in_order);
        if in_order != listed {
            return Err("tree order differs from the neighbour list".to_string());
        }

        if let Some(root) = self.root {
            if self.arcs[root.0].parent.is_some() {
                return Err("root has a parent".to_string());
            }
            self.check_subtree(root)?;
        }

        for (i, &id) in listed.iter().enumerate() {
            let arc = &self.arcs[id.0];
            if !arc.alive {
                return Err(format!("dead arc {:?} still linked", id));
            }
            if i == 0 && arc.left_breakpoint.is_some() {
                return Err("leftmost arc has a left breakpoint".to_string());
            }
            if i + 1 == listed.len() && arc.right_breakpoint.is_some() {
                return Err("rightmost arc has a right breakpoint".to_string());
            }
            let Some(&next) = listed.get(i + 1) else {
                continue;
            };
            let shared = arc.right_breakpoint;
            if shared.is_none() || shared != self.arcs[next.0].left_breakpoint {
                return Err(format!("arcs {:?} and {:?} do not share a breakpoint", id, next));
            }
            if let Some(bp_id) = shared {
                let bp = &self.breakpoints[bp_id.0];
                if bp.left_arc != id || bp.right_arc != next || !bp.alive {
                    return Err(format!("breakpoint {:?} points at the wrong arcs", bp_id));
                }
                if arc.site == self.arcs[next.0].site {
                    return Err(format!("breakpoint {:?} separates a site from itself", bp_id));
                }
            }
        }

        let xs: Vec<f64> = self.breakpoints().map(|(id, _)| self.breakpoint_x(id, sites, sweep_y)).collect();
        for pair in xs.windows(2) {
            let slack = 1e-6 * (1.0 + pair[0].abs().max(pair[1].abs()));
            if pair[1] < pair[0] - slack {
                return Err(format!("breakpoints out of order: {} then {}", pair[0], pair[1]));
            }
        }
        Ok(())
    }

    fn collect_in_order(&self, node: Option<ArcId>, out: &mut Vec<ArcId>) {
        if let Some(id) = node {
            self.collect_in_order(self.arcs[id.0].left, out);
            out.push(id);
            self.collect_in_order(self.arcs[id.0].right, out);
        }
    }

    /// Returns the subtree height after checking parent links and balance.
    fn check_subtree(&self, id: ArcId) -> Result<i32, String> {
        let arc = &self.arcs[id.0];
        let mut heights = [0, 0];
        for (slot, child) in [arc.left, arc.right].into_iter().enumerate() {
            if let Some(child) = child {
                if self.arcs[child.0].parent != Some(id) {
                    return Err(format!("arc {:?} has a stale parent link", child));
                }
                heights[slot] = self.check_subtree(child)?;
            }
        }
        if (heights[0] - heights[1]).abs() > 1 {
            return Err(format!("arc {:?} is out of balance", id));
        }
        let height = 1 + heights[0].max(heights[1]);
        if height != arc.height {
            return Err(format!("arc {:?} caches height {} but has {}", id, arc.height, height));
        }
        Ok(height)
    }
}
