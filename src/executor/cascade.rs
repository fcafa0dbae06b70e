//! Event Cascade Resolver.
//!
//! Shallow handling runs the listeners of an event once, without
//! finalizing them: whatever they emit is returned to the caller, which
//! decides how to continue. Requests are passed through untouched.

use std::sync::Arc;

use crate::core::{ExposedMutation, Result};
use crate::data::{CallerRef, SkillDefinition, SkillInfo};
use crate::triggers::{
    broadcast, CallerAndSkill, Event, EventAndRequest, EventName, ImmuneInfo, SkillArg,
};

use super::SkillExecutor;

impl SkillExecutor<'_> {
    /// Bind a fresh invocation.
    pub(crate) fn bind(&self, caller: CallerRef, skill: Arc<SkillDefinition>) -> SkillInfo {
        SkillInfo::new(caller, skill).with_preview(self.config.preview)
    }

    /// Run `f` between an opening and a closing `HandleEvent`
    /// notification. The closing bracket is sent even when `f` fails.
    pub(crate) fn bracketed<T>(
        &mut self,
        name: EventName,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.mutator.notify_with(vec![ExposedMutation::HandleEvent {
            is_close: false,
            event_name: name,
        }]);
        let result = f(self);
        self.mutator.notify_with(vec![ExposedMutation::HandleEvent {
            is_close: true,
            event_name: name,
        }]);
        result
    }

    /// Run the listeners of one event without finalizing them.
    ///
    /// For `ModifyZeroHealth` the first immunity granted is folded into the
    /// argument seen by later listeners and returned.
    pub(crate) fn resolve_shallow(&mut self, event: Event) -> Result<(Vec<EventAndRequest>, Option<ImmuneInfo>)> {
        self.bracketed(event.name(), |this| {
            let listeners = broadcast(this.mutator.state(), &event);
            let mut arg = SkillArg::Event(event);
            let mut emitted = Vec::new();
            let mut granted: Option<ImmuneInfo> = None;
            for CallerAndSkill { caller, skill } in listeners {
                let info = this.bind(caller, skill);
                if !(info.definition.filter)(this.mutator.state().as_ref(), &info, &arg) {
                    continue;
                }
                let out = this.run_skill(&info, &arg)?;
                emitted.extend(out.events);
                if let (None, Some(immune)) = (granted, out.immune) {
                    granted = Some(immune);
                    if let SkillArg::Event(Event::ModifyZeroHealth(damage)) = &mut arg {
                        damage.immune = Some(immune);
                    }
                }
            }
            Ok((emitted, granted))
        })
    }

    /// Shallow handling of a batch: events are resolved in order, requests
    /// pass through.
    pub(crate) fn handle_event_shallow(&mut self, events: Vec<EventAndRequest>) -> Result<Vec<EventAndRequest>> {
        let mut result = Vec::new();
        for event in events {
            match event {
                EventAndRequest::Request(_) => result.push(event),
                EventAndRequest::Event(event) => {
                    let (emitted, _) = self.resolve_shallow(event)?;
                    result.extend(emitted);
                }
            }
        }
        Ok(result)
    }
}
