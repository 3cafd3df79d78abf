mod chain;
mod channel;
mod factories;
mod timers;
